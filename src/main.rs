//! Level generation server
//!
//! Serves the procedural layout synthesizer over HTTP for the level editor.

use std::net::SocketAddr;

use clap::Parser;
use levelforge::core::error::{LevelError, Result};
use levelforge::server;

/// LevelForge map generation server
#[derive(Parser, Debug)]
#[command(name = "levelforge")]
#[command(about = "Procedural tactical level layout server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3003)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let ip = args
        .host
        .parse()
        .map_err(|_| LevelError::InvalidAddress(args.host.clone()))?;
    let addr = SocketAddr::new(ip, args.port);

    tracing::info!("LevelForge starting...");
    server::serve(addr).await
}
