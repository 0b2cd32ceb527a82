//! gRPC service implementation and per-request signal derivation.
//!
//! ## Structure
//!
//! - [`handler`] - `CitiesService` entry point (`CitiesApi`), shared with the
//!   HTTP transport.
//! - [`deadline`] - Parsing of the caller's `grpc-timeout` header.

pub mod deadline;
pub mod handler;
