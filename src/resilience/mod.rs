//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store call from a request task:
//!     → timeouts.rs (blocking pool + deadline)
//!     → On deadline: CanaryError::Timeout, mapped to 504 by the transport
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store call has a deadline
//! - No retries: a failed write is reported, never replayed

pub mod timeouts;
