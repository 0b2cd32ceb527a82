use crate::server::{
    service::handler::CitiesApi,
    telemetry::{
        increment_cancellations, increment_cities_produced, increment_requests,
        record_request_duration,
    },
};
use axum::{
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use citylist_tonic_core::Error;
use std::time::Instant;

const API_REST: &str = "rest";

/// Failures of the HTTP endpoint.
///
/// All of them are answered with an empty `500`. The distinguishing detail
/// only goes to the server log.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("error get list city: {0}")]
    List(#[from] Error),

    #[error("error marshalling result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        match &self {
            Self::List(e) => tracing::error!(error = %self, kind = e.kind(), "request failed"),
            Self::Serialization(_) => tracing::error!(error = %self, "request failed"),
        }
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// Returns every city as a JSON array.
#[tracing::instrument(skip_all, fields(api = API_REST))]
pub async fn list_cities(State(api): State<CitiesApi>) -> Result<Response, RestError> {
    let start = Instant::now();
    increment_requests(API_REST);

    let result = api.list_cities(api.config().rest_timeout).await;
    record_request_duration(API_REST, start.elapsed().as_millis() as f64);

    let cities = result.inspect_err(|e| {
        if e.is_cancellation() {
            increment_cancellations(API_REST, e.kind());
        }
    })?;
    let body = serde_json::to_vec(&cities)?;
    increment_cities_produced(API_REST, cities.len() as u64);

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response())
}
