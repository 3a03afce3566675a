//! Canary routing decision service library.

pub mod admin;
pub mod canary;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod service;
pub mod store;

pub use canary::{decide, AppRecord, CanaryError, ConfigSet, DecisionResult, Outcome};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::CanaryService;
pub use store::{ConfigStore, ConfigUpdater};
