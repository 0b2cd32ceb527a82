//! Errors surfaced by the producer and the delivery strategies.
//!
//! ## Error Cases
//! - `Cancelled`: the caller abandoned the request.
//! - `DeadlineExceeded`: the request's time budget elapsed.
//! - `UnknownCancellation`: the signal reported done without a recognizable
//!   reason. This is never downgraded to success.
//! - `TransportSend`: an item could not be handed to the delivery layer. This
//!   is unrelated to cancellation and is not retried.

/// Result alias used across the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `citylist` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The caller aborted the request.
    #[error("request is canceled")]
    Cancelled,

    /// The request's deadline passed before the work completed.
    #[error("deadline is exceeded")]
    DeadlineExceeded,

    /// The signal is done but carries no reason the classifier understands.
    #[error("request terminated for an unknown reason")]
    UnknownCancellation,

    /// The delivery layer refused an item (e.g. a broken stream).
    #[error("cannot send stream response: {context}")]
    TransportSend { context: String },
}

impl Error {
    /// Returns `true` for the terminal states a [`CancelSignal`] can produce.
    ///
    /// [`CancelSignal`]: crate::CancelSignal
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::DeadlineExceeded | Self::UnknownCancellation
        )
    }
}
