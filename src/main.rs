//! Servlet dispatch server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌────────────────────────────────────────────────────┐
//!     ────────────────────┼─▶ http server ──▶ Registry::request_dispatcher     │
//!                         │   (axum)            │                              │
//!                         │                     ▼                              │
//!                         │              routing (path → handler)              │
//!                         │                     │                              │
//!                         │                     ▼                              │
//!     Client Response     │              FilterChain: f1 → f2 → … → handler   │
//!     ◀───────────────────┼── into_axum_response ◀──┘                          │
//!                         │                                                    │
//!                         │  config (TOML + watcher) · lifecycle (container,  │
//!                         │  shutdown) · observability · admin API            │
//!                         └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use servlet_dispatch::config::{self, watcher::ConfigWatcher, DispatchConfig};
use servlet_dispatch::lifecycle::{container, signals, Shutdown};
use servlet_dispatch::observability::{logging, metrics};
use servlet_dispatch::{ComponentFactories, HttpServer, Registry};

#[derive(Parser, Debug)]
#[command(name = "servlet-dispatch")]
#[command(about = "Serve handlers and filter chains from a TOML deployment descriptor", long_about = None)]
struct Args {
    /// Deployment descriptor (TOML). Watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 1. Configuration
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => DispatchConfig::default(),
    };

    // 2. Logging
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init_logging(&level);
    tracing::info!("{} v{} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    // 3. Components
    let factories = ComponentFactories::with_builtins();
    config::validate_component_types(&config, &factories).map_err(config::ConfigError::Validation)?;
    let registry = container::get_or_init(|| {
        let registry = Registry::from_config(&config, &factories)?;
        registry.initialize()?;
        Ok(registry)
    })?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        handlers = registry.handler_count(),
        filters = registry.filter_count(),
        "Configuration loaded"
    );

    // 4. Metrics
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // 5. Shutdown and reload plumbing
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let (updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path, factories.clone());
            match watcher.run() {
                Ok(handle) => (Some(rx), Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    // 6. Listeners
    let server = HttpServer::new(&config, Arc::clone(&registry), factories);

    if config.admin.enabled {
        if config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
            tracing::warn!("Admin API is using the placeholder api_key");
        }
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");
        let admin = server.admin_router();
        let admin_shutdown = shutdown.wait();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin_listener, admin)
                .with_graceful_shutdown(admin_shutdown)
                .await
            {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, updates, shutdown).await?;

    container::reset();
    tracing::info!("Shutdown complete");
    Ok(())
}
