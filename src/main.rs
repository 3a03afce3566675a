//! Canary controller.
//!
//! Tells callers which cookie (canary variant) to set for an application,
//! based on a per-application split stored in a YAML file.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │               CANARY CONTROLLER               │
//!                    │                                               │
//!   GET /apps/x/cookie  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!   PUT / {app}  ───────▶│  http  │──▶│ service │──▶│   canary   │   │
//!                    │  │ server │   │ (async) │   │   engine   │   │
//!                    │  └────────┘   └────┬────┘   └────────────┘   │
//!   PUT /apps/x      │  ┌────────┐        │                          │
//!   (API key) ───────┼─▶│ admin  │────────┤                          │
//!                    │  └────────┘        ▼                          │
//!                    │              ┌───────────┐   ┌──────────┐     │
//!                    │              │  updater  │──▶│  store   │◀────┼── YAML file
//!                    │              │ (1 writer)│   │ load/save│     │
//!                    │              └───────────┘   └──────────┘     │
//!                    │                                               │
//!                    │   config · observability · lifecycle          │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use canary_controller::lifecycle::signals::shutdown_on_signal;
use canary_controller::lifecycle::startup::{bind, resolve_config, StartupOptions};
use canary_controller::lifecycle::Shutdown;
use canary_controller::observability::{logging, metrics};
use canary_controller::{CanaryService, HttpServer};

#[derive(Parser)]
#[command(name = "canary-controller")]
#[command(about = "Canary cookie decision service", long_about = None)]
struct Args {
    /// Service configuration (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canary store (YAML); overrides APP_CONFIG_PATH and the config file.
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Listen port; defaults to the store's Port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let options = StartupOptions {
        config_path: args.config,
        store_path: args.store,
        port: args.port,
    };
    let config = resolve_config(&options, |key| std::env::var(key).ok())?;

    logging::init_logging(&config.observability);
    tracing::info!("canary-controller v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        store = %config.store.path,
        io_timeout_ms = config.store.io_timeout_ms,
        auth_enabled = config.auth.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let service = CanaryService::from_config(&config.store);
    let listener = bind(&config, &service).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config, service);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
