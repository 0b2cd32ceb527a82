//! Minimal command-line caller for the cities service.
//!
//! Sends one request with a `grpc-timeout` and prints what comes back, so the
//! difference between the buffered and streaming calls is visible by hand:
//!
//! ```bash
//! citylist-client --mode stream --timeout-ms 3000
//! citylist-client --mode unary --timeout-ms 3000
//! ```

use citylist_tonic_core::proto::{EmptyMessage, cities_service_client::CitiesServiceClient};
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tonic::{Request, codec::CompressionEncoding, transport::Channel};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// `ListStream`: one message per city.
    Stream,
    /// `List`: the whole list in one reply.
    Unary,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server URI.
    #[arg(long, env = "CITYLIST_ADDR", default_value = "http://127.0.0.1:9099")]
    addr: String,

    /// Which call to make.
    #[arg(long, value_enum, default_value_t = Mode::Stream)]
    mode: Mode,

    /// Caller deadline, sent as `grpc-timeout`.
    #[arg(long, default_value_t = 3000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let channel = Channel::from_shared(args.addr)?.connect().await?;
    let mut client = CitiesServiceClient::new(channel)
        .accept_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Zstd);

    let mut req = Request::new(EmptyMessage {});
    req.set_timeout(Duration::from_millis(args.timeout_ms));

    match args.mode {
        Mode::Stream => {
            let mut stream = match client.list_stream(req).await {
                Ok(resp) => resp.into_inner(),
                Err(status) => {
                    println!("error: {}", status.message());
                    return Ok(());
                }
            };
            loop {
                match stream.message().await {
                    Ok(Some(msg)) => {
                        if let Some(city) = msg.city {
                            println!("{} {}", city.id, city.name);
                        }
                    }
                    Ok(None) => {
                        println!("end stream");
                        break;
                    }
                    Err(status) => {
                        println!("error: {}", status.message());
                        break;
                    }
                }
            }
        }
        Mode::Unary => match client.list(req).await {
            Ok(resp) => {
                for city in resp.into_inner().city {
                    println!("{} {}", city.id, city.name);
                }
            }
            Err(status) => println!("error: {}", status.message()),
        },
    }

    Ok(())
}
