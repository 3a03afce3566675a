//! Application lookup within a loaded canary store.

use crate::canary::error::{CanaryError, CanaryResult};
use crate::canary::types::{AppRecord, ConfigSet};

/// Find the record for `name`. The first match wins; later duplicates are never reached.
pub fn find_by_name<'a>(set: &'a ConfigSet, name: &str) -> CanaryResult<&'a AppRecord> {
    set.apps
        .iter()
        .find(|app| app.name == name)
        .ok_or_else(|| CanaryError::NotFound(name.to_string()))
}

/// Position of the first record named `name`.
pub fn position_of(set: &ConfigSet, name: &str) -> Option<usize> {
    set.apps.iter().position(|app| app.name == name)
}
