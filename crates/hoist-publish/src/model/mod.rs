//! Request, result, and copy-parameter types shared by the publishing pipeline.

use std::path::PathBuf;

/// Depth limit meaning "recurse without bound".
pub const UNLIMITED_DEPTH: i32 = -1;

/// Kind of asset resolved from a source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A single regular file.
    File,
    /// A directory tree.
    Directory,
}

impl AssetKind {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// A single publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Source file or directory, as given by the caller.
    pub source_path: PathBuf,
    /// Derive the destination name from the basename instead of the location.
    pub hash_by_name: bool,
    /// Directory recursion limit; negative means unlimited.
    pub depth_limit: i32,
    /// Re-synchronise a directory even when its destination exists.
    pub force_copy: bool,
}

impl AssetRequest {
    /// Request with default options: location hashing, unlimited depth, no forced copy.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            hash_by_name: false,
            depth_limit: UNLIMITED_DEPTH,
            force_copy: false,
        }
    }

    /// Toggle basename hashing.
    #[must_use]
    pub const fn with_hash_by_name(mut self, hash_by_name: bool) -> Self {
        self.hash_by_name = hash_by_name;
        self
    }

    /// Set the directory recursion limit.
    #[must_use]
    pub const fn with_depth_limit(mut self, depth_limit: i32) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Toggle forced directory re-synchronisation.
    #[must_use]
    pub const fn with_force_copy(mut self, force_copy: bool) -> Self {
        self.force_copy = force_copy;
        self
    }
}

/// Outcome of a successful publish, as remembered by the process cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    /// Source path exactly as requested.
    pub source_path: PathBuf,
    /// Whether a file or a directory was published.
    pub kind: AssetKind,
    /// Hashed destination directory name under the base path.
    pub destination_dir: String,
    /// Public URL of the published asset.
    pub public_address: String,
}

/// Parameters for one directory synchronisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    /// Allowed file suffixes; empty admits every file.
    pub file_types: Vec<String>,
    /// Exclusion tokens (names or root-relative sub-paths).
    pub exclusions: Vec<String>,
    /// Recursion limit; negative means unlimited.
    pub depth_limit: i32,
    /// Mode applied to created directories.
    pub new_dir_mode: Option<u32>,
    /// Mode applied to copied files; ignored for remote destinations.
    pub new_file_mode: Option<u32>,
    /// Whether the destination is remote.
    pub is_remote: bool,
}

impl Default for CopySpec {
    fn default() -> Self {
        Self {
            file_types: Vec::new(),
            exclusions: Vec::new(),
            depth_limit: UNLIMITED_DEPTH,
            new_dir_mode: None,
            new_file_mode: None,
            is_remote: false,
        }
    }
}

impl CopySpec {
    /// Maximum entry depth the walk should visit, or `None` when unlimited.
    ///
    /// With limit `L`, files are copied down to depth `L + 1` (direct children
    /// are depth 1) and directories are created down to depth `L`.
    #[must_use]
    pub fn max_walk_depth(&self) -> Option<usize> {
        usize::try_from(self.depth_limit)
            .ok()
            .map(|limit| limit.saturating_add(1))
    }

    /// Whether a directory found at `depth` should be created and descended into.
    #[must_use]
    pub fn admits_dir_at(&self, depth: usize) -> bool {
        usize::try_from(self.depth_limit)
            .ok()
            .is_none_or(|limit| depth <= limit)
    }
}
