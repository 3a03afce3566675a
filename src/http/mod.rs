//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, body/query/header parsing)
//!     → cookie.rs (decisions) / admin (records, API key gated)
//!     → CanaryService
//!     → response.rs (error → status, ETag)
//!     → Send to client
//! ```

pub mod cookie;
pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
