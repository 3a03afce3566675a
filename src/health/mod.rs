//! Release health probing.
//!
//! # Data Flow
//! ```text
//! releases / cookie names / cookie values (';'-delimited)
//!     → probe.rs (validate lengths)
//!     → GET status page once per release, with that release's cookie
//!     → body contains release name? → HealthReport (200 / 500)
//! ```
//!
//! # Design Decisions
//! - A length mismatch fails the whole probe before any request
//! - Stops at the first release that is missing, like a deploy gate
//! - Pages are fetched with `reqwest`; no cookie jar, one header per call

pub mod probe;

pub use probe::{split_list, HealthReport, ProbeTarget, ReleaseCheck, ReleaseResult};
