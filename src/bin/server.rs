//! Baruk API server binary.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use baruk_sdk::config::SeiNetworkConfig;
use baruk_sdk::server::{serve, AppState};
use baruk_sdk::tools::ToolAdapter;

#[derive(Debug, Parser)]
#[command(name = "baruk-server", about = "HTTP API for the Baruk DeFi platform on Sei")]
struct Args {
    /// Network to run against
    #[arg(long, default_value = "sei-pacific")]
    network: String,

    /// Bind host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    info!(network = %args.network, "Starting Baruk API server");

    let config = SeiNetworkConfig::load(&args.network)?;
    let adapter = ToolAdapter::new(config)?;
    let state = AppState {
        adapter: Arc::new(adapter),
    };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    serve(addr, state).await?;
    Ok(())
}
