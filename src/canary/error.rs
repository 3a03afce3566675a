//! Error taxonomy for canary decisions and the canary store.

use thiserror::Error;

use crate::store::Version;

/// Errors that can occur while loading, deciding or updating.
#[derive(Debug, Error)]
pub enum CanaryError {
    /// Store resource missing, unreadable or unwritable.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store content is not a valid canary configuration.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Expiration is not of the form `<hours>h`.
    #[error("Invalid duration '{0}': expected '<hours>h'")]
    InvalidDuration(String),

    /// Stored canary percent is outside `[0, 1]` or not a number.
    #[error("Invalid canary percent {0}: expected a value in [0, 1]")]
    InvalidPercent(f64),

    /// No record with the requested name.
    #[error("Could not find application {0}")]
    NotFound(String),

    /// Caller supplied a value outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store changed since the caller read it.
    #[error("Store changed since it was read (expected version {expected}, found {actual})")]
    Conflict { expected: Version, actual: Version },

    /// Store I/O did not finish within the configured bound.
    #[error("Store I/O timed out after {0} ms")]
    Timeout(u64),

    /// The blocking task running store I/O panicked or was cancelled.
    #[error("Store task failed: {0}")]
    Task(String),
}

/// Result type for canary operations.
pub type CanaryResult<T> = Result<T, CanaryError>;
