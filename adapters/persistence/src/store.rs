//! Save slot storage.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// File name of the single save slot inside a [`FileStore`] directory.
pub const SLOT_FILE: &str = "slot-1.json";
const TEMP_SUFFIX: &str = ".tmp";

/// Errors raised by a save slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The slot exists but could not be read.
    #[error("could not read save slot {}: {source}", path.display())]
    Read {
        /// Location of the slot.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The slot could not be written.
    #[error("could not write save slot {}: {source}", path.display())]
    Write {
        /// Location that failed to accept the write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The slot could not be removed.
    #[error("could not clear save slot {}: {source}", path.display())]
    Clear {
        /// Location of the slot.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Storage holding a single encoded snapshot.
pub trait SnapshotStore {
    /// Reads the slot; `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the slot contents.
    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Empties the slot.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Slot kept in memory, for tests and throwaway sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Option<Vec<u8>>,
}

impl MemoryStore {
    /// Creates a store whose slot already holds `bytes`.
    #[must_use]
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Some(bytes.into()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        self.slot = Some(bytes.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.slot = None;
        Ok(())
    }
}

/// Slot stored as [`SLOT_FILE`] inside a directory.
///
/// Writes go to a sibling temporary file that is renamed over the slot, so a
/// crash mid-write never leaves a truncated save behind.
#[derive(Clone, Debug)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `directory`. The directory is created on the first save.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory holding the slot.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of the slot file.
    #[must_use]
    pub fn slot_path(&self) -> PathBuf {
        self.directory.join(SLOT_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.directory.join(format!("{SLOT_FILE}{TEMP_SUFFIX}"))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.slot_path();
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.directory).map_err(|source| StoreError::Write {
            path: self.directory.clone(),
            source,
        })?;

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;

        let path = self.slot_path();
        fs::rename(&temp, &path).map_err(|source| StoreError::Write { path, source })?;
        tracing::debug!(bytes = bytes.len(), "save slot written");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let path = self.slot_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Clear { path, source }),
        }
    }
}
