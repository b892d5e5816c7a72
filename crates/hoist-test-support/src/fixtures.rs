//! Test fixtures for filesystem-heavy suites.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Locate the workspace root by walking up from the calling crate's manifest.
#[must_use]
pub fn repo_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let is_workspace = fs::read_to_string(ancestor.join("Cargo.toml"))
            .is_ok_and(|manifest| manifest.contains("[workspace]"));
        if is_workspace {
            return ancestor.to_path_buf();
        }
    }
    manifest_dir
}

/// Shared scratch directory that keeps test artefacts inside the workspace.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn server_root() -> Result<PathBuf> {
    let root = repo_root().join(".server_root");
    fs::create_dir_all(&root)
        .with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

/// Temporary directory removed on drop.
pub struct TempRoot {
    dir: TempDir,
}

impl TempRoot {
    /// Create a fresh directory under [`server_root`] with the given prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(server_root()?)
            .context("failed to create temporary root")?;
        Ok(Self { dir })
    }

    /// Path of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create (or reuse) a sub-directory and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn mkdir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(path)
    }

    /// Write a file relative to the root, creating parents as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        write_file(&self.dir.path().join(relative), contents)
    }
}

/// Write a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a parent directory or the file cannot be written.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Set the modification time of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or updated.
pub fn set_mtime(path: &Path, modified: SystemTime) -> Result<()> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.set_modified(modified)
        .with_context(|| format!("failed to set mtime on {}", path.display()))?;
    Ok(())
}

/// Move a file's modification time forward by `delta`.
///
/// # Errors
///
/// Returns an error if the current mtime cannot be read or the update fails.
pub fn advance_mtime(path: &Path, delta: Duration) -> Result<SystemTime> {
    let current = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to read mtime of {}", path.display()))?;
    let next = current + delta;
    set_mtime(path, next)?;
    Ok(next)
}

/// List every regular file under `root` as sorted, slash-separated relative paths.
///
/// # Errors
///
/// Returns an error if the tree cannot be traversed.
pub fn relative_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("failed to relativise {}", entry.path().display()))?;
            let parts = relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            files.push(parts.join("/"));
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_root_writes_nested_files() -> Result<()> {
        let root = TempRoot::new("hoist-fixtures-")?;
        root.write("a/b/c.txt", "c")?;
        root.write("top.txt", "top")?;
        assert_eq!(relative_files(root.path())?, vec!["a/b/c.txt", "top.txt"]);
        Ok(())
    }

    #[test]
    fn advance_mtime_moves_forward() -> Result<()> {
        let root = TempRoot::new("hoist-fixtures-")?;
        let file = root.write("file.txt", "x")?;
        let before = fs::metadata(&file)?.modified()?;
        let after = advance_mtime(&file, Duration::from_secs(30))?;
        assert!(after > before);
        assert_eq!(fs::metadata(&file)?.modified()?, after);
        Ok(())
    }

    #[test]
    fn temp_root_is_removed_on_drop() -> Result<()> {
        let path = {
            let root = TempRoot::new("hoist-fixtures-")?;
            root.path().to_path_buf()
        };
        assert!(!path.exists());
        Ok(())
    }
}
