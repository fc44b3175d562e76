//! Generic JSON record storage.
//!
//! Provides [`JsonStore`], a typed handle to one named JSON document on disk.
//! Writes overwrite the whole file; there is no locking, so concurrent
//! writers from different processes race and the last write wins.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::errors::StoreError;

/// Typed handle to a JSON document at a fixed path.
pub struct JsonStore<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> std::fmt::Debug for JsonStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore").field("path", &self.path).finish()
    }
}

impl<T> JsonStore<T> {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    /// Reads the document.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// `Err(StoreError::Corrupt)` when it exists but does not parse as `T`.
    /// A file holding JSON `null` is reported as corrupt.
    pub fn load(&self) -> Result<Option<T>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let value: Option<T> = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        value.map(Some).ok_or_else(|| {
            StoreError::Corrupt(format!("{} contains null", self.path.display()))
        })
    }

    /// Serializes `value` and overwrites the file, creating parent directories.
    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Io(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::write(&self.path, json).map_err(|e| {
            StoreError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned + Default> JsonStore<T> {
    /// Reads the document, recovering from every storage error.
    ///
    /// Missing files yield `T::default()` silently; unreadable or corrupt
    /// files are logged and also yield the default.
    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(error = %e, "falling back to default record");
                T::default()
            }
        }
    }
}
