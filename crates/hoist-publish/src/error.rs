//! # Design
//!
//! - Constant-message errors with structured context for every publishing stage.
//! - Transfer failures stay distinguishable from walk and lookup failures so callers
//!   can tell a missing source from an unreachable destination.
//! - Source errors are preserved rather than interpolated into messages.

use std::io;
use std::path::PathBuf;

use suppaftp::FtpError;
use thiserror::Error;

/// Result type for transport operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Result type for directory synchronisation.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for lock marker operations.
pub type LockResult<T> = Result<T, LockError>;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors raised while moving bytes to a destination.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination address uses a scheme no transport handles.
    #[error("unsupported destination scheme")]
    UnsupportedScheme {
        /// Scheme found in the destination address.
        scheme: String,
    },
    /// The destination address could not be interpreted.
    #[error("invalid destination address")]
    InvalidAddress {
        /// Offending address.
        address: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// Opening a control connection failed.
    #[error("remote connection failed")]
    Connect {
        /// `host:port` that was dialled.
        host: String,
        /// Underlying FTP error.
        source: FtpError,
    },
    /// The remote server rejected the credentials.
    #[error("remote authentication failed")]
    Authenticate {
        /// User name presented to the server.
        user: String,
        /// Underlying FTP error.
        source: FtpError,
    },
    /// Uploading a file to the remote server failed.
    #[error("remote upload failed")]
    Upload {
        /// Remote path being written.
        path: String,
        /// Underlying FTP error.
        source: FtpError,
    },
    /// A remote command other than an upload failed.
    #[error("remote command failed")]
    Remote {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Remote path involved.
        path: String,
        /// Underlying FTP error.
        source: FtpError,
    },
    /// Local filesystem failures.
    #[error("transfer io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The transport cannot perform the requested operation.
    #[error("transport operation unsupported")]
    Unsupported {
        /// Operation that was requested.
        operation: &'static str,
        /// Transport that rejected it.
        transport: &'static str,
    },
}

impl TransferError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn remote(operation: &'static str, path: impl Into<String>, source: FtpError) -> Self {
        Self::Remote {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while mirroring a directory tree.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Copying a file or creating a directory failed; the walk stopped there.
    #[error("directory sync transfer failed")]
    Transfer {
        /// Entry path relative to the synchronised root.
        relative_path: String,
        /// Underlying transfer error.
        source: TransferError,
    },
    /// Reading the source tree failed.
    #[error("directory sync walk failed")]
    Walk {
        /// Source root being walked.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
}

/// Errors raised by the lock marker store.
#[derive(Debug, Error)]
pub enum LockError {
    /// Filesystem failure while touching, listing, or removing markers.
    #[error("lock marker io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl LockError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced to callers of the publish coordinator.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The source path is neither a regular file nor a directory.
    #[error("asset not found")]
    NotFound {
        /// Source path as requested.
        path: PathBuf,
    },
    /// The configured local destination is unusable.
    #[error("invalid destination base path")]
    InvalidBasePath {
        /// Configured base path.
        path: String,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// The configured destination uses an unsupported scheme.
    #[error("unsupported destination scheme")]
    UnsupportedScheme {
        /// Scheme found in the base path.
        scheme: String,
    },
    /// Publishing a single file failed.
    #[error("asset transfer failed")]
    Transfer {
        /// Source path being published.
        asset: PathBuf,
        /// Underlying transfer error.
        source: TransferError,
    },
    /// Publishing a directory failed part way through.
    #[error("asset directory sync failed")]
    Sync {
        /// Source directory being published.
        asset: PathBuf,
        /// Underlying sync error.
        source: SyncError,
    },
}

impl PublishError {
    /// Whether the error reports a missing source asset.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn transfer(asset: impl Into<PathBuf>, source: TransferError) -> Self {
        Self::Transfer {
            asset: asset.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_are_constant_and_sources_preserved() {
        let io_err = TransferError::io(
            "copy_file",
            "/tmp/assets/app.css",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io_err.to_string(), "transfer io failure");
        assert!(io_err.source().is_some());

        let sync = SyncError::Transfer {
            relative_path: "css/app.css".into(),
            source: io_err,
        };
        assert_eq!(sync.to_string(), "directory sync transfer failed");
        assert!(sync.source().is_some());

        let publish = PublishError::Sync {
            asset: PathBuf::from("/srv/app/assets"),
            source: sync,
        };
        assert_eq!(publish.to_string(), "asset directory sync failed");
        assert!(!publish.is_not_found());
    }

    #[test]
    fn not_found_is_reported() {
        let err = PublishError::NotFound {
            path: PathBuf::from("/missing"),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "asset not found");
        assert!(err.source().is_none());
    }

    #[test]
    fn lock_errors_keep_context() {
        let err = LockError::io(
            "lock.touch",
            "/var/locks/abc.lock",
            io::Error::other("disk full"),
        );
        let LockError::Io {
            operation, path, ..
        } = &err;
        assert_eq!(*operation, "lock.touch");
        assert_eq!(path, &PathBuf::from("/var/locks/abc.lock"));
    }

    #[test]
    fn unsupported_operation_names_transport() {
        let err = TransferError::Unsupported {
            operation: "link",
            transport: "ftp",
        };
        assert_eq!(err.to_string(), "transport operation unsupported");
        assert!(err.source().is_none());
    }
}
