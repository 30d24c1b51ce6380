//! Durable local storage for the journal.
//!
//! The entire entry log lives in one named JSON record on disk: written on
//! every change, read once at startup. Writes go to a sibling temp file and
//! are renamed into place so a crash mid-write cannot truncate the journal.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::journal::entry::MoodEntry;

/// File-backed storage for the serialized entry log.
#[derive(Debug, Clone)]
pub struct JournalStorage {
    path: PathBuf,
}

impl JournalStorage {
    /// Create storage backed by the given file path.
    ///
    /// The file is not touched until the first [`load`](Self::load) or
    /// [`save`](Self::save).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The journal file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted entry log.
    ///
    /// A missing file is not an error: it yields an empty log, matching
    /// first-run behavior.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadFailed`] on I/O failure and
    /// [`StorageError::Corrupt`] when the payload does not parse.
    pub fn load(&self) -> Result<Vec<MoodEntry>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no journal file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })
    }

    /// Write the full entry log, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::WriteFailed`] if serialization or any file
    /// operation fails.
    pub fn save(&self, entries: &[MoodEntry]) -> Result<(), StorageError> {
        let payload = serde_json::to_vec(entries).map_err(|e| StorageError::WriteFailed {
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed {
                    message: e.to_string(),
                })?;
            }
        }

        // Temp file in the same directory so the rename stays on one filesystem.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &payload).map_err(|e| StorageError::WriteFailed {
            message: e.to_string(),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::WriteFailed {
            message: e.to_string(),
        })?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            bytes = payload.len(),
            "journal persisted"
        );
        Ok(())
    }
}
