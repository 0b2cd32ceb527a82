use citylist_server::server::{
    config::{CliArgs, ServerConfig},
    supervisor,
    telemetry::init_telemetry,
};
use clap::Parser;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let res = supervisor::run(config).await;
    if let Err(e) = &res {
        tracing::error!(error = %e, "server exited with error");
    }
    providers.shutdown();

    Ok(res?)
}
