//! Timeout enforcement for blocking store I/O.
//!
//! # Responsibilities
//! - Move synchronous store reads/writes off the async workers
//! - Bound each call with a deadline
//!
//! # Design Decisions
//! - Uses Tokio's blocking pool and timer
//! - Timeout errors are distinct from other errors
//! - A timed-out call keeps running on the blocking pool; only the caller stops waiting

use std::time::Duration;

use crate::canary::error::{CanaryError, CanaryResult};

/// Run `f` on the blocking pool, giving up after `timeout`.
pub async fn run_blocking<T, F>(timeout: Duration, f: F) -> CanaryResult<T>
where
    F: FnOnce() -> CanaryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(CanaryError::Task(join_error.to_string())),
        Err(_) => Err(CanaryError::Timeout(timeout.as_millis() as u64)),
    }
}
