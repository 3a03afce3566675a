//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `store.path`.
pub const STORE_PATH_ENV: &str = "APP_CONFIG_PATH";
/// Environment variable overriding `auth.api_key` (and enabling auth).
pub const API_KEY_ENV: &str = "API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Apply environment overrides using `lookup` as the variable source.
///
/// Called once at startup; nothing else in the crate reads the environment.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(STORE_PATH_ENV).filter(|v| !v.is_empty()) {
        config.store.path = path;
    }
    if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
        config.auth.api_key = key;
        config.auth.enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_partial_file() {
        let config = parse_config(
            r#"
            [listener]
            port = 8181

            [store]
            path = "/tmp/canary.yaml"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, Some(8181));
        assert_eq!(config.store.path, "/tmp/canary.yaml");
        assert_eq!(config.store.io_timeout_ms, 2000);
        assert_eq!(
            config.observability.log_format,
            crate::config::schema::LogFormat::Json
        );
    }

    #[test]
    fn test_sample_config_file() {
        let config = parse_config(include_str!("../../config/canary-controller.toml")).unwrap();
        assert_eq!(config.listener.port, None);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_config("[listener"), Err(ConfigError::Parse(_))));
        let err = parse_config("[auth]\nenabled = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("auth.api_key"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [(STORE_PATH_ENV, "/data/apps.yaml"), (API_KEY_ENV, "s3cret")]
            .into_iter()
            .collect();
        let mut config = ServiceConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.store.path, "/data/apps.yaml");
        assert_eq!(config.auth.api_key, "s3cret");
        assert!(config.auth.enabled);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.store.path, ServiceConfig::default().store.path);
        assert!(!config.auth.enabled);
    }
}
