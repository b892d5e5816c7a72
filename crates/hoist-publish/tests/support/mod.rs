use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use hoist_publish::{LocalTransport, TransferError, TransferResult, Transport, TransportKind};

/// Local transport that counts calls and can be told to fail one file.
pub struct SpyTransport {
    inner: LocalTransport,
    fail_on: Option<String>,
    copies: AtomicUsize,
    stats: AtomicUsize,
    copied: Mutex<Vec<String>>,
}

impl SpyTransport {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: LocalTransport::new(root),
            fail_on: None,
            copies: AtomicUsize::new(0),
            stats: AtomicUsize::new(0),
            copied: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(root: &Path, file_name: &str) -> Self {
        Self {
            fail_on: Some(file_name.to_string()),
            ..Self::new(root)
        }
    }

    /// Successful and attempted copies.
    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }

    /// Destination existence and freshness queries.
    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    /// File names copied successfully, in order.
    pub fn copied(&self) -> Vec<String> {
        self.copied
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

impl Transport for SpyTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }

    fn ensure_dir(&self, dir: &str, mode: Option<u32>) -> TransferResult<()> {
        self.inner.ensure_dir(dir, mode)
    }

    fn dir_exists(&self, dir: &str) -> TransferResult<bool> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.dir_exists(dir)
    }

    fn modified(&self, dir: &str, file_name: &str) -> TransferResult<Option<SystemTime>> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.modified(dir, file_name)
    }

    fn copy_file(&self, source: &Path, dir: &str, file_name: &str) -> TransferResult<u64> {
        self.copies.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref() == Some(file_name) {
            return Err(TransferError::Io {
                operation: "spy.copy",
                path: PathBuf::from(dir).join(file_name),
                source: io::Error::other("injected failure"),
            });
        }
        let bytes = self.inner.copy_file(source, dir, file_name)?;
        if let Ok(mut names) = self.copied.lock() {
            names.push(file_name.to_string());
        }
        Ok(bytes)
    }

    fn set_file_mode(&self, dir: &str, file_name: &str, mode: u32) -> TransferResult<()> {
        self.inner.set_file_mode(dir, file_name, mode)
    }

    fn link(&self, source: &Path, target: &str) -> TransferResult<bool> {
        self.inner.link(source, target)
    }
}
