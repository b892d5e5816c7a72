//! Advisory lock markers that freeze published assets.
//!
//! A marker is an empty file named `<key>.lock` inside the lock directory.
//! Its presence tells the coordinator to skip every existence and freshness
//! check for the asset. Markers are only ever created by publishing; removal
//! is an operator action.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{LockError, LockResult};

/// File suffix of lock markers.
pub const LOCK_SUFFIX: &str = ".lock";

/// Marker store rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockManager {
    dir: PathBuf,
}

impl LockManager {
    /// Store rooted at `dir`. Nothing is created until [`LockManager::prepare`] or [`LockManager::lock`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the markers.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker path for an asset key.
    #[must_use]
    pub fn marker_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{LOCK_SUFFIX}"))
    }

    /// Create the lock directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn prepare(&self) -> LockResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|source| LockError::io("lock.prepare", &self.dir, source))
    }

    /// Whether a marker exists for `key`.
    #[must_use]
    pub fn is_locked(&self, key: &str) -> bool {
        self.marker_path(key).is_file()
    }

    /// Create the marker for `key`, or refresh its timestamp if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or marker cannot be written.
    pub fn lock(&self, key: &str) -> LockResult<()> {
        self.prepare()?;
        let marker = self.marker_path(key);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .map_err(|source| LockError::io("lock.touch", &marker, source))?;
        file.set_modified(SystemTime::now())
            .map_err(|source| LockError::io("lock.touch", &marker, source))?;
        debug!(key = %key, marker = %marker.display(), "asset locked");
        Ok(())
    }

    /// Keys of every marker currently present, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> LockResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(LockError::io("lock.list", &self.dir, source)),
        };
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LockError::io("lock.list", &self.dir, source))?;
            let name = entry.file_name();
            if let Some(key) = name.to_string_lossy().strip_suffix(LOCK_SUFFIX)
                && entry.path().is_file()
            {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Remove the marker for `key`. Returns whether a marker was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be removed.
    pub fn unlock(&self, key: &str) -> LockResult<bool> {
        let marker = self.marker_path(key);
        match fs::remove_file(&marker) {
            Ok(()) => {
                debug!(key = %key, "asset unlocked");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(LockError::io("lock.unlock", &marker, source)),
        }
    }
}
