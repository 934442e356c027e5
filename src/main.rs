//! Tenant edge server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     TENANT EDGE                       │
//!   Request       │  ┌───────────┐   ┌──────────────┐   ┌─────────────┐  │
//!   (Host, path) ─┼─▶│   http    │──▶│   routing    │──▶│ site / api  │  │
//!                 │  │  server   │   │ host rewrite │   │  handlers   │  │
//!                 │  └───────────┘   └──────────────┘   └──────┬──────┘  │
//!                 │                                            │         │
//!                 │                                            ▼         │
//!                 │                                   ┌──────────────┐   │
//!                 │                                   │ provisioning │   │
//!                 │                                   └──┬────┬───┬──┘   │
//!                 │                                      │    │   │      │
//!                 └──────────────────────────────────────┼────┼───┼──────┘
//!                                                        ▼    ▼   ▼
//!                                                  hosting  DNS  site store
//!                                                    API
//! ```
//!
//! The config path comes from the first argument or `TENANT_EDGE_CONFIG`;
//! without either the built-in defaults are used.

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tenant_edge::config::{load_config, watcher::ConfigWatcher, EdgeConfig};
use tenant_edge::http::HttpServer;
use tenant_edge::lifecycle::{build_services, signals, Shutdown};
use tenant_edge::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TENANT_EDGE_CONFIG").ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tenant-edge starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        platform_domains = config.platform.domains.len(),
        base_domains = ?config.platform.base_domains,
        hosting_configured = config.hosting.is_configured(),
        request_timeout_secs = config.timeouts.request_secs,
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

    // The watcher must stay alive for updates to flow.
    let (config_updates, _watcher) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let services = build_services(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, services);
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    signals::wait_for_signal(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
