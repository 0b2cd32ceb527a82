//! Mapping terminal signal states to caller-facing errors.

use crate::{CancelReason, CancelSignal, Error, Result};

/// Maps a cancellation reason to the error a caller should see.
///
/// `CancelReason::None` maps to `None` (no error). The match is exhaustive
/// with no fallback arm, so a new reason cannot silently become success.
pub fn classify(reason: CancelReason) -> Option<Error> {
    match reason {
        CancelReason::None => None,
        CancelReason::Cancelled => Some(Error::Cancelled),
        CancelReason::DeadlineExceeded => Some(Error::DeadlineExceeded),
    }
}

/// The per-item check shared by every delivery strategy.
///
/// Returns `Ok(())` while `signal` is live. Once it is done this always
/// returns an error: a done signal that reports no reason is surfaced as
/// [`Error::UnknownCancellation`] rather than being read as success.
pub fn check<S: CancelSignal + ?Sized>(signal: &S) -> Result<()> {
    if !signal.is_done() {
        return Ok(());
    }
    Err(terminal_error(signal))
}

/// The error for a signal already known to be done, e.g. after awaiting
/// [`CancelSignal::done`].
pub fn terminal_error<S: CancelSignal + ?Sized>(signal: &S) -> Error {
    classify(signal.reason()).unwrap_or(Error::UnknownCancellation)
}
