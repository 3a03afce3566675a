//! Canary decision subsystem.
//!
//! # Data Flow
//! ```text
//! app name
//!     → lookup.rs (find record in a freshly loaded ConfigSet)
//!     → engine.rs (expiration + split, random source injected)
//!     → DecisionResult (serialized by the transport layer)
//! ```
//!
//! # Design Decisions
//! - Records are immutable once loaded; a decision never mutates them
//! - The split rule is strict: `sample < CanaryPercent` is success
//! - Clock and randomness are parameters, never ambient state

pub mod engine;
pub mod error;
pub mod lookup;
pub mod types;
pub mod validation;

pub use engine::{decide, FixedSample, RandomSource, RngSource, SampleSequence};
pub use error::{CanaryError, CanaryResult};
pub use lookup::find_by_name;
pub use types::{
    AppRecord, CanaryConfig, ConfigSet, DecisionResult, KeyValue, LoggingFlags, Outcome, ViewFlags,
};
