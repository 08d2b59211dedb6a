//! Standalone tournament server binary
//!
//! Usage: cargo run -p pokerd-server --bin pokerd

use clap::Parser;
use pokerd_server::{PokerServer, ServerConfig};

/// pokerd - No-Limit Texas Hold'em tournament server for bots
#[derive(Parser, Debug)]
#[command(name = "pokerd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port number to bind to
    #[arg(short, long, default_value_t = 8765)]
    port: u16,

    /// Deck shuffle seed for reproducible tournaments
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pokerd_server::init_logging();

    let args = Args::parse();
    let mut config = ServerConfig::new(args.host, args.port);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let handle = PokerServer::new(config).start().await?;
    tracing::info!("server ready; waiting for bots to connect");
    println!("pokerd listening on ws://{}", handle.address());
    println!("press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
