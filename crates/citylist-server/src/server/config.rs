use anyhow::bail;
use citylist::{DEFAULT_CITY_COUNT, ProducerConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the `citylist-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults matching the reference
/// deployment: gRPC on 9099, HTTP on 8099, 49 cities at 100ms each.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "citylist-server",
    version,
    about = "Serves a slowly produced city list over gRPC and HTTP, honouring cancellation"
)]
pub struct CliArgs {
    /// Address for the gRPC listener.
    ///
    /// Environment variable: `GRPC_ADDR`
    #[arg(long, env = "GRPC_ADDR", default_value_t = String::from("0.0.0.0:9099"))]
    pub grpc_addr: String,

    /// Address for the HTTP listener.
    ///
    /// Environment variable: `REST_ADDR`
    #[arg(long, env = "REST_ADDR", default_value_t = String::from("0.0.0.0:8099"))]
    pub rest_addr: String,

    /// Number of cities produced per call.
    ///
    /// Environment variable: `CITY_COUNT`
    #[arg(long, env = "CITY_COUNT", default_value_t = DEFAULT_CITY_COUNT)]
    pub city_count: u32,

    /// Simulated cost of producing one city, in milliseconds.
    ///
    /// This also bounds how late a cancellation can be noticed: work stops
    /// at the next per-city check, at most one pacing interval after the
    /// request ended.
    ///
    /// Environment variable: `PACING_MS`
    #[arg(long, env = "PACING_MS", default_value_t = 100)]
    pub pacing_ms: u64,

    /// Fixed seed for city names. When unset every call draws a new seed.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Server-side time budget for HTTP requests, in milliseconds.
    ///
    /// HTTP callers cannot send a deadline, so without this an HTTP request
    /// only ends early when the client goes away or the server shuts down.
    ///
    /// Environment variable: `REST_TIMEOUT_MS`
    #[arg(long, env = "REST_TIMEOUT_MS")]
    pub rest_timeout_ms: Option<u64>,

    /// Capacity of the buffer between the streaming work loop and the gRPC
    /// response stream.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub grpc_addr: SocketAddr,
    pub rest_addr: SocketAddr,
    pub producer: ProducerConfig,
    pub rest_timeout: Option<Duration>,
    pub stream_buffer_size: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let grpc_addr: SocketAddr = match args.grpc_addr.parse() {
            Ok(addr) => addr,
            Err(e) => bail!("GRPC_ADDR ({}) is not a socket address: {e}", args.grpc_addr),
        };
        let rest_addr: SocketAddr = match args.rest_addr.parse() {
            Ok(addr) => addr,
            Err(e) => bail!("REST_ADDR ({}) is not a socket address: {e}", args.rest_addr),
        };

        if grpc_addr == rest_addr {
            bail!("GRPC_ADDR and REST_ADDR must differ (both are {grpc_addr})");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.rest_timeout_ms == Some(0) {
            bail!("REST_TIMEOUT_MS must be greater than 0 when set");
        }

        Ok(Self {
            grpc_addr,
            rest_addr,
            producer: ProducerConfig {
                count: args.city_count,
                pacing: Duration::from_millis(args.pacing_ms),
                seed: args.seed,
            },
            rest_timeout: args.rest_timeout_ms.map(Duration::from_millis),
            stream_buffer_size: args.stream_buffer_size,
        })
    }
}
