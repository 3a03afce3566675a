//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! canary-controller.toml
//!     → loader.rs (parse & deserialize)
//!     → env overrides (APP_CONFIG_PATH, API_KEY), once at startup
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to the service and HTTP server at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Canary records are not part of this config; they are re-read from the
//!   store on every request

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ServiceConfig;
pub use schema::{AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig, StoreConfig};
