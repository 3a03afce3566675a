//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the service config and apply environment overrides once
//! - Build the canary service around the injected store location
//! - Resolve the listen port (config first, else the store's `Port`)
//!
//! # Design Decisions
//! - Fail fast: a bad service config is fatal
//! - A missing or broken canary store is not: the port falls back and
//!   requests report the store error until it is fixed

use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::loader::{apply_env_overrides, load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::ServiceConfig;
use crate::service::CanaryService;

/// Port used when neither the config nor the store names one.
pub const FALLBACK_PORT: u16 = 8080;

/// Command-line overrides, applied after the environment.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Resolve the effective service configuration.
pub fn resolve_config<F>(options: &StartupOptions, env: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    if let Some(path) = &options.store_path {
        config.store.path = path.display().to_string();
    }
    if let Some(port) = options.port {
        config.listener.port = Some(port);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bind the listener, taking the port from the store when unconfigured.
pub async fn bind(config: &ServiceConfig, service: &CanaryService) -> std::io::Result<TcpListener> {
    let store_port = if config.listener.port.is_some() {
        FALLBACK_PORT
    } else {
        match service.load().await {
            Ok((set, _)) if set.port != 0 => set.port,
            Ok(_) => FALLBACK_PORT,
            Err(e) => {
                tracing::warn!(error = %e, port = FALLBACK_PORT, "Could not read port from canary store");
                FALLBACK_PORT
            }
        }
    };

    let address = config.listener.bind_address(store_port);
    TcpListener::bind(&address).await
}
