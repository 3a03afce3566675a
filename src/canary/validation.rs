//! Semantic validation of canary records.
//!
//! Serde only checks shape. These checks run before an update is accepted
//! into the store and report every problem, not just the first.

use std::fmt;

use crate::canary::engine::parse_expiration;
use crate::canary::error::CanaryError;
use crate::canary::types::AppRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    InvalidExpiration(String),
    PercentOutOfRange(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "application name is empty"),
            ValidationError::InvalidExpiration(spec) => {
                write!(f, "expiration '{}' is not of the form '<hours>h'", spec)
            }
            ValidationError::PercentOutOfRange(p) => {
                write!(f, "canary percent {} is outside [0, 1]", p)
            }
        }
    }
}

/// Check one record.
pub fn validate_record(record: &AppRecord) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if record.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if parse_expiration(&record.cookie_info.expiration).is_err() {
        errors.push(ValidationError::InvalidExpiration(
            record.cookie_info.expiration.clone(),
        ));
    }
    let percent = record.cookie_info.canary_percent;
    if !(0.0..=1.0).contains(&percent) {
        errors.push(ValidationError::PercentOutOfRange(percent));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collapse validation failures of a caller-supplied record into one
/// `InvalidArgument`.
pub fn into_canary_error(errors: Vec<ValidationError>) -> CanaryError {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    CanaryError::InvalidArgument(joined)
}
