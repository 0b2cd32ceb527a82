//! Shared protocol, conversions, and error definitions used by the citylist
//! server and client.
//!
//! ## Submodules
//!
//! - [`error`] - Service error type and its `tonic::Status` mapping.
//! - [`types`] - Conversions between core [`citylist::City`] values and wire
//!   messages.
//! - [`proto`] - Generated `CitiesService` bindings.

pub mod error;
pub mod types;

pub use error::{Error, Result};

/// gRPC service and message definitions generated from `proto/cities.proto`.
///
/// ## Service
///
/// - `List` - returns every city in one `Cities` message, or an error and no
///   cities.
/// - `ListStream` - sends one `CityStream` message per city as it is
///   produced, ending with an error status if the call was cancelled or its
///   deadline passed.
pub mod proto {
    tonic::include_proto!("cities");
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("cities_descriptor");
}
