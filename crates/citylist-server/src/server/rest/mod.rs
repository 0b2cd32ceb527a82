//! HTTP transport for the city list.
//!
//! Any method on any path returns the buffered list as a JSON array. The
//! endpoint shares [`CitiesApi::list_cities`] with the gRPC `List` call, so it
//! has the same all-or-nothing semantics.
//!
//! HTTP callers only ever see `200` or an empty `500`; the reason for a
//! failure (cancellation, deadline, serialization) is logged server side.
//!
//! [`CitiesApi::list_cities`]: crate::server::service::handler::CitiesApi::list_cities

pub mod handler;

use crate::server::service::handler::CitiesApi;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Creates the HTTP router.
pub fn create_router(api: CitiesApi) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(handler::list_cities)
        .layer(cors)
        .with_state(api)
}
