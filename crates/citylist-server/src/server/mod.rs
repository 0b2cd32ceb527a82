//! Server internals: configuration, the shared cities service, both
//! transports, and the supervisor that runs them.

pub mod config;
pub mod rest;
pub mod service;
pub mod streaming;
pub mod supervisor;
pub mod telemetry;
