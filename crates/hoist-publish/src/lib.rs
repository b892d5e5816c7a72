#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Asset publication engine.
//!
//! Given a local file or directory, publishes a copy under a hashed directory
//! name at a local or FTP destination and returns the public address of the copy.
//!
//! Layout: `service.rs` (publish coordinator), `sync.rs` (directory mirroring),
//! `validator.rs` (exclusion and suffix rules), `transport/` (local and FTP
//! transports), `lock.rs` (advisory lock markers), `cache.rs` (process-lifetime
//! results), `hash.rs` (destination naming), `host.rs` (destination settings),
//! `model/` (request and result types), `error.rs` (error types).

pub mod cache;
pub mod error;
pub mod hash;
pub mod host;
pub mod lock;
pub mod model;
pub mod service;
pub mod sync;
pub mod transport;
pub mod validator;

pub use cache::PublishCache;
pub use error::{
    LockError, LockResult, PublishError, PublishResult, SyncError, SyncResult, TransferError,
    TransferResult,
};
pub use host::{AssetHost, PublishPolicy};
pub use lock::LockManager;
pub use model::{AssetKind, AssetRequest, CopySpec, PublishedAsset, UNLIMITED_DEPTH};
pub use service::PublishCoordinator;
pub use sync::{DirectorySynchronizer, SyncReport};
pub use transport::{FtpTarget, FtpTransport, LocalTransport, Transport, TransportKind};
pub use validator::{PathValidator, is_valid_entry};
