/// Why a request stopped being live.
///
/// `None` is the answer while the request is still live. Once a signal is
/// done the reason is fixed and every later read returns the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CancelReason {
    /// No termination has been recorded.
    #[default]
    None,
    /// The caller abandoned the request.
    Cancelled,
    /// The request's time budget elapsed.
    DeadlineExceeded,
}

impl CancelReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl core::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read-only, per-request cancellation signal.
///
/// The transport that owns the request decides when the signal is done and
/// why. Work loops only read it: either by polling [`is_done`] between units
/// of work, or by awaiting [`done`] when they would rather wait than poll.
/// Both may be used concurrently from any number of readers.
///
/// A signal transitions from live to done at most once and never back.
///
/// # Example
/// ```
/// use citylist::{CancelReason, CancelSignal};
///
/// struct AlreadyExpired;
/// impl CancelSignal for AlreadyExpired {
///     fn is_done(&self) -> bool {
///         true
///     }
///     fn reason(&self) -> CancelReason {
///         CancelReason::DeadlineExceeded
///     }
///     fn done(&self) -> impl Future<Output = ()> + Send {
///         core::future::ready(())
///     }
/// }
///
/// assert!(citylist::check(&AlreadyExpired).is_err());
/// ```
///
/// [`is_done`]: CancelSignal::is_done
/// [`done`]: CancelSignal::done
pub trait CancelSignal {
    /// Non-blocking liveness query.
    fn is_done(&self) -> bool;

    /// The recorded termination reason. Only meaningful once
    /// [`is_done`](CancelSignal::is_done) returns `true`.
    fn reason(&self) -> CancelReason;

    /// Resolves once the signal is done. Resolves immediately if it already
    /// is.
    fn done(&self) -> impl Future<Output = ()> + Send;
}
