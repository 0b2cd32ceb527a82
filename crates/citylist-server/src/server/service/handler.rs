//! `CitiesService` implementation shared by the gRPC and HTTP transports.
//!
//! This module defines [`CitiesApi`], which owns the per-request half of the
//! cancellation story: for every call it creates a [`ContextSource`], wires
//! the transport's own termination triggers into it (caller deadline, client
//! disconnect, process shutdown), and hands the read-only context to one of
//! the delivery strategies in [`citylist::delivery`].
//!
//! ## Responsibilities
//!
//! - `List` runs buffered delivery on a spawned task while the handler holds
//!   a [`ContextGuard`], so a dropped handler stops the work cooperatively.
//! - `ListStream` runs incremental delivery via [`feed_cities`], forwarding
//!   each city as soon as it exists.
//! - Map delivery outcomes to `tonic::Status` and record telemetry.

use crate::server::{
    config::ServerConfig,
    service::deadline::grpc_timeout,
    streaming::coordinator::feed_cities,
    telemetry::{
        increment_cancellations, increment_cities_produced, increment_requests,
        record_request_duration,
    },
};
use citylist::{CancelSignal, City, ContextGuard, ContextSource, delivery::buffered, terminal_error};
use citylist_tonic_core::{
    Error,
    proto::{Cities, CityStream, EmptyMessage, cities_service_server::CitiesService},
};
use core::pin::Pin;
use futures::TryStreamExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::Instrument;

pub(crate) const API_LIST: &str = "list";
pub(crate) const API_LIST_STREAM: &str = "list_stream";

/// Head start of a unary call's own deadline over the transport's
/// `grpc-timeout` timer, so the caller gets `DEADLINE_EXCEEDED` from us
/// rather than the transport's generic timeout.
pub const UNARY_DEADLINE_MARGIN: Duration = Duration::from_millis(20);

/// The cities service.
///
/// Cheap to clone; every clone shares the same configuration and process
/// shutdown token.
#[derive(Clone, Debug)]
pub struct CitiesApi {
    config: ServerConfig,
    shutdown: CancellationToken,
}

impl CitiesApi {
    /// Creates the service. Every request context is cancelled once
    /// `shutdown` fires.
    pub fn new(config: ServerConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Creates the signal source for one call.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open_context(&self, timeout: Option<Duration>) -> ContextSource {
        let source = ContextSource::new();
        if let Some(timeout) = timeout {
            source.expire_after(timeout);
        }
        source.cancel_when(self.shutdown.clone().cancelled_owned());
        source
    }

    /// Runs buffered delivery for one call and returns every city, or the
    /// classified error and nothing.
    ///
    /// The work runs on its own task. The call answers as soon as the
    /// context ends, without waiting for the task to reach its next check.
    /// If the future returned here is dropped before completion, the request
    /// is cancelled and the task stops at its next check instead of finishing
    /// unobserved work.
    pub async fn list_cities(&self, timeout: Option<Duration>) -> Result<Vec<City>, Error> {
        let guard: ContextGuard = self.open_context(timeout).into_guard();
        let ctx = guard.context();
        let mut producer = self.config.producer.build();

        let work = {
            let ctx = ctx.clone();
            tokio::spawn(
                async move { buffered::collect(&ctx, &mut producer).await }.in_current_span(),
            )
        };

        let cities = tokio::select! {
            biased;
            res = work => res.map_err(|e| Error::Internal {
                context: format!("list task failed: {e}"),
            })??,
            () = ctx.done() => return Err(terminal_error(&ctx).into()),
        };

        drop(guard);
        Ok(cities)
    }
}

#[tonic::async_trait]
impl CitiesService for CitiesApi {
    type ListStreamStream = Pin<Box<dyn Stream<Item = Result<CityStream, Status>> + Send>>;

    /// Returns every city in one message, or an error status and no cities.
    ///
    /// The deadline comes from the caller's `grpc-timeout` header, shortened
    /// by [`UNARY_DEADLINE_MARGIN`] because tonic runs its own timer on the
    /// same header and would otherwise answer first with `CANCELLED`.
    #[tracing::instrument(skip_all, fields(api = API_LIST))]
    async fn list(&self, req: Request<EmptyMessage>) -> Result<Response<Cities>, Status> {
        let start = Instant::now();
        let timeout =
            grpc_timeout(req.metadata()).map(|t| t.saturating_sub(UNARY_DEADLINE_MARGIN));
        increment_requests(API_LIST);

        let result = self.list_cities(timeout).await;
        record_request_duration(API_LIST, start.elapsed().as_millis() as f64);

        match result {
            Ok(cities) => {
                tracing::info!(count = cities.len(), "listed cities");
                increment_cities_produced(API_LIST, cities.len() as u64);
                Ok(Response::new(cities.into()))
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "list failed");
                if e.is_cancellation() {
                    increment_cancellations(API_LIST, e.kind());
                }
                Err(e.into())
            }
        }
    }

    /// Streams one message per city as it is produced.
    ///
    /// The call ends early, after whatever was already sent, when the
    /// caller's `grpc-timeout` elapses, the caller goes away, or the server
    /// shuts down. The last stream element then carries the error status.
    #[tracing::instrument(skip_all, fields(api = API_LIST_STREAM))]
    async fn list_stream(
        &self,
        req: Request<EmptyMessage>,
    ) -> Result<Response<Self::ListStreamStream>, Status> {
        let start = Instant::now();
        let timeout = grpc_timeout(req.metadata());
        increment_requests(API_LIST_STREAM);

        let (resp_tx, resp_rx) =
            mpsc::channel::<Result<CityStream, Status>>(self.config.stream_buffer_size);

        let source = self.open_context(timeout);
        {
            // The receiver is dropped when the client goes away.
            let resp_tx = resp_tx.clone();
            source.cancel_when(async move { resp_tx.closed().await });
        }
        let guard = source.into_guard();
        let producer = self.config.producer.build();

        let fut = async move {
            match feed_cities(guard, producer, resp_tx).await {
                Ok(sent) => {
                    tracing::info!(sent, "streamed cities");
                }
                Err(e) => {
                    tracing::warn!(error = %e, kind = e.kind(), "stream ended early");
                    if e.is_cancellation() {
                        increment_cancellations(API_LIST_STREAM, e.kind());
                    }
                }
            }
            record_request_duration(API_LIST_STREAM, start.elapsed().as_millis() as f64);
        };
        tokio::spawn(fut.instrument(tracing::info_span!("streaming")));

        let stream = ReceiverStream::new(resp_rx).inspect_ok(|_| {
            increment_cities_produced(API_LIST_STREAM, 1);
        });

        Ok(Response::new(Box::pin(stream)))
    }
}
