//! Runs the gRPC and HTTP listeners side by side and owns process shutdown.
//!
//! Both listeners share one [`CancellationToken`]. It is cancelled when the
//! process receives SIGINT/SIGTERM or when either listener stops on its own;
//! every in-flight request context is linked to it, so outstanding work ends
//! with a cancellation instead of running to completion. The listeners are
//! then given [`DRAIN_TIMEOUT`] to finish before they are aborted.

use crate::server::{config::ServerConfig, rest, service::handler::CitiesApi};
use citylist_tonic_core::proto::{FILE_DESCRIPTOR_SET, cities_service_server::CitiesServiceServer};
use core::future::Future;
use std::{io, net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, signal, task::JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Upper bound on how long the listeners may take to drain after shutdown.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

const GRPC: &str = "grpc";
const REST: &str = "rest";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error("{transport} listener cannot bind {addr}: {source}")]
    Bind {
        transport: &'static str,
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("{transport} listener failed: {source}")]
    Serve {
        transport: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("{transport} listener stopped unexpectedly")]
    Stopped { transport: &'static str },

    #[error("listener task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The two bound sockets, ready to serve.
#[derive(Debug)]
pub struct Listeners {
    grpc: TcpListener,
    rest: TcpListener,
}

impl Listeners {
    /// Binds both configured addresses concurrently.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ListenError> {
        let (grpc, rest) = tokio::try_join!(
            bind(GRPC, config.grpc_addr),
            bind(REST, config.rest_addr)
        )?;
        Ok(Self { grpc, rest })
    }

    pub fn grpc_addr(&self) -> io::Result<SocketAddr> {
        self.grpc.local_addr()
    }

    pub fn rest_addr(&self) -> io::Result<SocketAddr> {
        self.rest.local_addr()
    }
}

async fn bind(transport: &'static str, addr: SocketAddr) -> Result<TcpListener, ListenError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenError::Bind {
            transport,
            addr,
            source,
        })
}

/// Binds and serves until SIGINT/SIGTERM or the first listener failure.
pub async fn run(config: ServerConfig) -> Result<(), ListenError> {
    let listeners = Listeners::bind(&config).await?;
    serve(listeners, config, shutdown_signal()).await
}

/// Serves both listeners until `signal` resolves or one of them stops.
///
/// Returns the first listener error, if any. A shutdown requested through
/// `signal` is a clean exit.
pub async fn serve<F>(listeners: Listeners, config: ServerConfig, signal: F) -> Result<(), ListenError>
where
    F: Future<Output = ()> + Send,
{
    log_startup_info(&listeners, &config);

    let shutdown = CancellationToken::new();
    let api = CitiesApi::new(config, shutdown.clone());

    let mut set = JoinSet::new();
    set.spawn(serve_grpc(listeners.grpc, api.clone(), shutdown.clone()));
    set.spawn(serve_rest(listeners.rest, api, shutdown.clone()));

    let mut first_error = tokio::select! {
        () = signal => {
            tracing::info!("Shutdown signal received, terminating gracefully...");
            None
        }
        Some(res) = set.join_next() => {
            let err = flatten(res);
            if let Err(e) = &err {
                tracing::error!(error = %e, "listener failed, shutting down");
            }
            err.err()
        }
    };

    shutdown.cancel();

    let drain = async {
        while let Some(res) = set.join_next().await {
            if let Err(e) = res.map_err(ListenError::from).and_then(|(_, r)| r) {
                tracing::warn!(error = %e, "listener failed during shutdown");
                first_error.get_or_insert(e);
            }
        }
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::warn!(timeout = ?DRAIN_TIMEOUT, "listeners did not drain in time, aborting");
        set.abort_all();
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            tracing::info!("Service shut down successfully");
            Ok(())
        }
    }
}

/// A listener that returns before shutdown was requested is always an error.
fn flatten(
    res: Result<(&'static str, Result<(), ListenError>), tokio::task::JoinError>,
) -> Result<(), ListenError> {
    match res? {
        (_, Err(e)) => Err(e),
        (transport, Ok(())) => Err(ListenError::Stopped { transport }),
    }
}

async fn serve_grpc(
    listener: TcpListener,
    api: CitiesApi,
    shutdown: CancellationToken,
) -> (&'static str, Result<(), ListenError>) {
    let serve_err = |e: BoxError| ListenError::Serve {
        transport: GRPC,
        source: e,
    };

    let res = async {
        let (health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<CitiesServiceServer<CitiesApi>>()
            .await;

        let reflection = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|e| serve_err(e.into()))?;

        Server::builder()
            .accept_http1(true)
            .http2_adaptive_window(Some(true))
            .layer(
                ServiceBuilder::new()
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    )
                    .layer(GrpcWebLayer::new()),
            )
            .add_service(health_service)
            .add_service(reflection)
            .add_service(build_cities_service(api))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                shutdown.cancelled().await;
                health_reporter
                    .set_not_serving::<CitiesServiceServer<CitiesApi>>()
                    .await;
            })
            .await
            .map_err(|e| serve_err(e.into()))
    }
    .await;

    (GRPC, res)
}

fn build_cities_service(api: CitiesApi) -> CitiesServiceServer<CitiesApi> {
    CitiesServiceServer::new(api)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn serve_rest(
    listener: TcpListener,
    api: CitiesApi,
    shutdown: CancellationToken,
) -> (&'static str, Result<(), ListenError>) {
    let res = axum::serve(listener, rest::create_router(api))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ListenError::Serve {
            transport: REST,
            source: e.into(),
        });

    (REST, res)
}

fn log_startup_info(listeners: &Listeners, config: &ServerConfig) {
    let grpc = listeners.grpc_addr().unwrap_or(config.grpc_addr);
    let rest = listeners.rest_addr().unwrap_or(config.rest_addr);
    if cfg!(debug_assertions) {
        tracing::info!(%grpc, %rest, "Starting city service with full config: {config:#?}");
    } else {
        tracing::info!(%grpc, %rest, count = config.producer.count, "Starting city service");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            core::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
