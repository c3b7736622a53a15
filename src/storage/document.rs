//! JSON document persistence.
//!
//! A [`JsonStore`] owns one file path. Loading creates the default document
//! when the file is missing; saving replaces the file atomically through a
//! temporary file in the same directory.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::Result;

/// A persisted document with schema defaults and a consistency check.
pub trait Document: Serialize + DeserializeOwned + Default {
    /// Short name used in log messages.
    const KIND: &'static str;

    /// Return `false` if the document violates its invariants.
    fn validate(&self) -> bool;
}

/// Load/save handle for a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T: Document> JsonStore<T> {
    /// Create a store for the document at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _doc: PhantomData,
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, creating and saving the default if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is corrupt, fails
    /// validation, or the default document cannot be written.
    pub fn load_or_create(&self) -> Result<T> {
        if self.path.exists() {
            return self.load();
        }

        let doc = T::default();
        self.save(&doc)?;
        tracing::info!(kind = T::KIND, path = %self.path.display(), "Created default file");
        Ok(doc)
    }

    /// Load an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for the
    /// schema (including missing keys or unknown enum values), or fails validation.
    pub fn load(&self) -> Result<T> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| StorageError::Load {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let doc: T =
            serde_json::from_str(&raw).map_err(|e| StorageError::corrupt(&self.path, e))?;

        if !doc.validate() {
            return Err(StorageError::Invalid {
                path: self.path.display().to_string(),
                reason: format!("{} failed validation", T::KIND),
            }
            .into());
        }

        tracing::debug!(kind = T::KIND, path = %self.path.display(), "Loaded existing file");
        Ok(doc)
    }

    /// Validate and atomically overwrite the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails validation or cannot be written.
    pub fn save(&self, doc: &T) -> Result<()> {
        if !doc.validate() {
            return Err(StorageError::Invalid {
                path: self.path.display().to_string(),
                reason: format!("refusing to save invalid {}", T::KIND),
            }
            .into());
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| self.save_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.save_error(e))?;
        serde_json::to_writer_pretty(&mut tmp, doc).map_err(|e| self.save_error(e))?;
        tmp.write_all(b"\n").map_err(|e| self.save_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.save_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.save_error(e.error))?;

        tracing::debug!(kind = T::KIND, path = %self.path.display(), "Saved file");
        Ok(())
    }

    fn save_error(&self, reason: impl ToString) -> StorageError {
        StorageError::Save {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
