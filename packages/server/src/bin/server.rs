//! One-to-one chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tegami-server -- --seed config/users.json
//! cargo run --bin tegami-server -- --host 0.0.0.0 --port 3000 --config config/server.toml
//! ```

use std::sync::Arc;

use clap::Parser;
use tegami_server::{
    infrastructure::seed::SeedData,
    ui::{Server, config::ServerConfig, state::AppState},
};
use tegami_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tegami-server")]
#[command(about = "One-to-one real-time chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number to bind the server to
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Configuration file (replaces config/server.toml)
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// JSON file with the users and their tokens
    #[arg(short = 's', long)]
    seed: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 設定の読み込み（コマンドライン引数が最優先）
    let mut config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(seed) = args.seed {
        config.seed_path = Some(seed);
    }

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_CRATE_NAME"), "tower_http"],
        &config.log_level,
        config.log_format(),
    );

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    // Initialize dependencies in order:
    // 1. Seed data
    // 2. Listener (the bound address is part of the media URLs)
    // 3. AppState
    // 4. Server
    let seed = match &config.seed_path {
        Some(path) => SeedData::load(path)?,
        None => {
            tracing::warn!("No seed file configured; every connection will be rejected");
            SeedData::default()
        }
    };

    let listener = tokio::net::TcpListener::bind(config.listener_addr()?).await?;
    let public_base_url = config.public_base_url(listener.local_addr()?);
    tracing::info!("Media is served from {}/media", public_base_url);

    let state = AppState::in_memory(&config, seed, &public_base_url);
    Server::new(Arc::new(state)).serve(listener).await?;
    Ok(())
}
