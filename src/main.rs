//! Casino relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP client
//!       │
//!       ▼
//!   http (axum router) ──▶ operations (validate before any network call)
//!                              │
//!          ┌───────────────────┼──────────────────────┐
//!          ▼                   ▼                      ▼
//!   treasury guard      transactions              entropy engine
//!   (balance probe)     submitter → seal waiter   (commit → delay → reveal → query)
//!          │                   │        │             │
//!          │                   │        ▼             │
//!          │                   │   games extractor    │
//!          ▼                   ▼                      ▼
//!   ledger: FailoverClient (retry policy) → FlowRestClient per access node
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use casino_relay::config::{load_config, RelayConfig};
use casino_relay::observability::{logging, metrics};
use casino_relay::{HttpServer, RelayContext};

#[derive(Parser)]
#[command(name = "casino-relay")]
#[command(about = "Treasury-sponsored casino relay for the Flow ledger", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "casino-relay starting");
    tracing::info!(
        network = %config.ledger.network,
        endpoints = config.ledger.access_endpoints.len(),
        treasury = %config.treasury.address,
        commit_mode = %config.entropy.commit_mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address.clone();
    let ctx = Arc::new(RelayContext::from_config(config)?);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(ctx).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
