//! Canary store: load and save the full record set.
//!
//! # Data Flow
//! ```text
//! backend (file / memory)
//!     → ConfigStore::load (parse YAML, every call re-reads)
//!     → ConfigSet
//!
//! ConfigUpdater::update_record
//!     → lock → load → replace by name → validate → save (whole overwrite)
//! ```
//!
//! # Design Decisions
//! - No cache: every read goes to the backend
//! - The location is injected at construction, never looked up per call
//! - Writes are serialized by the updater; cross-process writers use the
//!   content `Version` to detect lost updates

pub mod backend;
pub mod updater;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::canary::error::{CanaryError, CanaryResult};
use crate::canary::types::ConfigSet;

pub use backend::{FileBackend, MemoryBackend, StoreBackend};
pub use updater::ConfigUpdater;

/// Content version of the store: the first 8 bytes of the SHA-256 of its
/// raw text, big-endian. Stable across builds and hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(pub u64);

impl Version {
    pub fn of(contents: &str) -> Self {
        let digest = Sha256::digest(contents.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Version(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Version {
    type Err = CanaryError;

    /// Accepts the bare hex form as well as a quoted (optionally weak) ETag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let hex = trimmed.trim_matches('"');
        u64::from_str_radix(hex, 16)
            .map(Version)
            .map_err(|_| CanaryError::InvalidArgument(format!("invalid version '{}'", s)))
    }
}

/// Loads and saves the whole canary record set.
#[derive(Debug)]
pub struct ConfigStore {
    backend: Box<dyn StoreBackend>,
}

impl ConfigStore {
    pub fn new(backend: impl StoreBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Store backed by the YAML file at `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Read and parse the current record set.
    pub fn load(&self) -> CanaryResult<ConfigSet> {
        self.load_versioned().map(|(set, _)| set)
    }

    /// Read and parse the current record set together with its version.
    pub fn load_versioned(&self) -> CanaryResult<(ConfigSet, Version)> {
        let raw = self.backend.read()?;
        let set: ConfigSet = serde_yaml::from_str(&raw)?;
        tracing::debug!(
            location = %self.backend.location(),
            apps = set.apps.len(),
            "Canary store loaded"
        );
        Ok((set, Version::of(&raw)))
    }

    /// Overwrite the whole resource with `set`; returns the new version.
    pub fn save(&self, set: &ConfigSet) -> CanaryResult<Version> {
        let raw = serde_yaml::to_string(set)?;
        self.backend.write(&raw)?;
        tracing::debug!(
            location = %self.backend.location(),
            apps = set.apps.len(),
            "Canary store saved"
        );
        Ok(Version::of(&raw))
    }
}
