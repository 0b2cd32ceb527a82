//! Error types for the cities service.
//!
//! This module defines the central `Error` enum returned by the service layer
//! and implements `From<Error>` for `tonic::Status`, so callers see a typed
//! status that keeps cancellation and deadline expiry apart.
//!
//! ## Error Cases
//! - `Delivery`: the work loop ended early, either through the request's
//!   cancellation signal or because the response stream broke.
//! - `Internal`: the task running the work loop failed (e.g. panicked).

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the cities service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The producer or delivery strategy stopped with an error.
    #[error(transparent)]
    Delivery(#[from] citylist::Error),

    /// The task executing the request did not complete.
    #[error("Internal error: {context}")]
    Internal { context: String },
}

impl Error {
    /// Returns `true` when the request ended through its cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Delivery(e) if e.is_cancellation())
    }

    /// Short, stable label for logs and metric attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delivery(citylist::Error::Cancelled) => "cancelled",
            Self::Delivery(citylist::Error::DeadlineExceeded) => "deadline_exceeded",
            Self::Delivery(citylist::Error::UnknownCancellation) => "unknown_cancellation",
            Self::Delivery(citylist::Error::TransportSend { .. }) => "transport_send",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Delivery(e) => match e {
                citylist::Error::Cancelled => Status::cancelled(e.to_string()),
                citylist::Error::DeadlineExceeded => Status::deadline_exceeded(e.to_string()),
                citylist::Error::UnknownCancellation => Status::aborted(e.to_string()),
                citylist::Error::TransportSend { .. } => Status::unknown(e.to_string()),
            },
            Error::Internal { context } => Status::internal(format!("Internal error: {context}")),
        }
    }
}
