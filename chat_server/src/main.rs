//! Chat relay server binary.
//!
//! Wires the pieces of the library together:
//!
//! - `PrivatBankClient` — the upstream rate source, shared by all sessions.
//! - `RateAggregator` — bounds concurrent lookups across every client.
//! - `ConnectionRegistry` — the set of live connections used for broadcast.
//! - `MessageRouter` — runs each session; `RelayListener` accepts the connections.
//!
//! Ctrl+C (or SIGTERM on Unix) stops accepting and closes the live sessions.

use std::sync::Arc;

use chat_server::config::Config;
use chat_server::listener::RelayListener;
use chat_server::rates::{PrivatBankClient, RateAggregator};
use chat_server::registry::ConnectionRegistry;
use chat_server::router::MessageRouter;
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let config = Config::parse();
    info!(
        "Starting chat server on {} (rates: {}, max in flight: {})",
        config.bind_addr(),
        config.api_url,
        config.max_in_flight
    );

    let source = Arc::new(PrivatBankClient::new(&config.api_url, config.request_timeout())?);
    let aggregator = RateAggregator::new(source, config.max_in_flight);
    let registry = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(MessageRouter::new(
        registry,
        aggregator,
        config.session_settings(),
    ));

    let listener = RelayListener::bind(&config.bind_addr()).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    listener.serve(router, shutdown).await;
    info!("Chat server stopped");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
