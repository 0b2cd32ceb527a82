//! Bridging incremental delivery onto the gRPC response stream.
//!
//! - [`coordinator`] - Runs one streaming call and forwards its terminal
//!   error.
//! - [`emitter`] - [`Emitter`](citylist::delivery::incremental::Emitter)
//!   over the response channel.

pub mod coordinator;
pub mod emitter;
