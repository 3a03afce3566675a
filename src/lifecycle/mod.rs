//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     CLI flags → service config → env overrides → validate
//!     → canary store probe (port) → bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listener
//! - Environment is read once, here, and nowhere else

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
