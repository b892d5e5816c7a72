//! Same-host filesystem transport.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tracing::{debug, warn};

use super::{Transport, TransportKind};
use crate::error::{TransferError, TransferResult};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Copies files beneath a local root directory.
///
/// Files are written to a staging name in the destination directory and then
/// renamed into place, so concurrent publishers never observe a partially
/// written file.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    /// Transport rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a slash-separated relative destination.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    fn staging_path(target: &Path) -> PathBuf {
        let sequence = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{name}.{}-{sequence}.partial", process::id()))
    }
}

impl Transport for LocalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }

    fn ensure_dir(&self, dir: &str, mode: Option<u32>) -> TransferResult<()> {
        let path = self.resolve(dir);
        fs::create_dir_all(&path)
            .map_err(|source| TransferError::io("local.create_dir", &path, source))?;
        if let Some(mode) = mode {
            apply_mode(&path, mode);
        }
        Ok(())
    }

    fn dir_exists(&self, dir: &str) -> TransferResult<bool> {
        let path = self.resolve(dir);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(TransferError::io("local.stat_dir", &path, source)),
        }
    }

    fn modified(&self, dir: &str, file_name: &str) -> TransferResult<Option<SystemTime>> {
        let path = self.resolve(dir).join(file_name);
        match fs::metadata(&path) {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|source| TransferError::io("local.mtime", &path, source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TransferError::io("local.stat_file", &path, source)),
        }
    }

    fn copy_file(&self, source: &Path, dir: &str, file_name: &str) -> TransferResult<u64> {
        let target = self.resolve(dir).join(file_name);
        let staging = Self::staging_path(&target);
        let bytes = fs::copy(source, &staging).map_err(|err| {
            let _ = fs::remove_file(&staging);
            TransferError::io("local.copy", &target, err)
        })?;
        if let Err(err) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            return Err(TransferError::io("local.rename", &target, err));
        }
        debug!(
            source = %source.display(),
            target = %target.display(),
            bytes,
            "copied file"
        );
        Ok(bytes)
    }

    fn set_file_mode(&self, dir: &str, file_name: &str, mode: u32) -> TransferResult<()> {
        let path = self.resolve(dir).join(file_name);
        set_permissions(&path, mode)
    }

    fn link(&self, source: &Path, target: &str) -> TransferResult<bool> {
        let link_path = self.resolve(target);
        if fs::symlink_metadata(&link_path).is_ok() {
            return Ok(false);
        }
        if let Some(parent) = link_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| TransferError::io("local.link_parent", parent, err))?;
        }
        symlink(source, &link_path)?;
        debug!(
            source = %source.display(),
            link = %link_path.display(),
            "linked asset"
        );
        Ok(true)
    }
}

fn apply_mode(path: &Path, mode: u32) {
    if let Err(err) = set_permissions(path, mode) {
        warn!(
            path = %path.display(),
            mode = %format!("0o{mode:o}"),
            error = %err,
            "failed to apply directory mode"
        );
    }
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> TransferResult<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|source| TransferError::io("local.chmod", path, source))
}

#[cfg(not(unix))]
fn set_permissions(path: &Path, mode: u32) -> TransferResult<()> {
    let _ = (path, mode);
    Err(TransferError::Unsupported {
        operation: "set_file_mode",
        transport: TransportKind::Local.as_str(),
    })
}

#[cfg(unix)]
fn symlink(source: &Path, link_path: &Path) -> TransferResult<()> {
    std::os::unix::fs::symlink(source, link_path)
        .map_err(|err| TransferError::io("local.symlink", link_path, err))
}

#[cfg(not(unix))]
fn symlink(source: &Path, link_path: &Path) -> TransferResult<()> {
    let _ = (source, link_path);
    Err(TransferError::Unsupported {
        operation: "link",
        transport: TransportKind::Local.as_str(),
    })
}
