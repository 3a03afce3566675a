//! Storage media for the canary store.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tempfile::NamedTempFile;

/// Where the raw store text lives.
///
/// Reads are always whole-resource; writes always replace the whole resource.
pub trait StoreBackend: Send + Sync + fmt::Debug {
    fn read(&self) -> io::Result<String>;
    fn write(&self, contents: &str) -> io::Result<()>;
    /// Human-readable location for logs.
    fn location(&self) -> String;
}

/// A YAML file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StoreBackend for FileBackend {
    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    /// Write to a sibling temp file, then rename it over the target so a
    /// concurrent reader sees either the old or the new content. The target's
    /// existing permissions carry over to the replacement.
    fn write(&self, contents: &str) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        match fs::metadata(&self.path) {
            Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-process buffer; `None` behaves like a missing file.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: RwLock<Option<String>>,
}

impl MemoryBackend {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: RwLock::new(Some(contents.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Current raw contents.
    pub fn snapshot(&self) -> Option<String> {
        self.contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StoreBackend for MemoryBackend {
    fn read(&self) -> io::Result<String> {
        self.snapshot()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "in-memory store is empty"))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self
            .contents
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
