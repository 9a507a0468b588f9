//! Tessella - Shared Collaborative Pixel Canvas
//!
//! CLI entry point for the Tessella server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod server;
mod websocket;

/// Tessella server command line
#[derive(Debug, Parser)]
#[command(name = "tessella", version, about = "Shared real-time collaborative pixel canvas")]
struct Cli {
    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessella=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Starting Tessella v{}", env!("CARGO_PKG_VERSION"));

    let mut config = server::load_config()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    server::run(config).await
}
