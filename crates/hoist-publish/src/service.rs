//! Top-level publish operation.
//!
//! # Design
//! - The transport is chosen once, from the host's base path, when the
//!   coordinator is built.
//! - Each call runs: cache lookup, resolve, lock pre-check, file or directory
//!   strategy, lock commit, cache insert.
//! - Lock markers are advisory. Failing to write one is logged and counted but
//!   never fails the publish.

use std::fs::{self, Metadata};
use std::path::Path;
use std::sync::Arc;

use hoist_config::PublishConfig;
use hoist_telemetry::Metrics;
use tracing::{debug, info, info_span, warn};

use crate::cache::PublishCache;
use crate::error::{LockError, PublishError, PublishResult, TransferError};
use crate::hash;
use crate::host::{AssetHost, PublishPolicy};
use crate::lock::LockManager;
use crate::model::{AssetKind, AssetRequest, CopySpec, PublishedAsset};
use crate::sync::DirectorySynchronizer;
use crate::transport::{self, Transport, TransportKind, join_path};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Copied,
    Fresh,
    Synced,
    Present,
    Linked,
    Locked,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Fresh => "fresh",
            Self::Synced => "synced",
            Self::Present => "present",
            Self::Linked => "linked",
            Self::Locked => "locked",
        }
    }
}

/// Publishes files and directories to the configured destination and hands
/// back their public addresses.
pub struct PublishCoordinator {
    host: Arc<dyn AssetHost>,
    policy: PublishPolicy,
    transport: Arc<dyn Transport>,
    locks: Option<LockManager>,
    cache: Arc<PublishCache>,
    metrics: Option<Metrics>,
}

impl PublishCoordinator {
    /// Build a coordinator, selecting the transport from `host.base_path()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base path uses an unsupported scheme or names
    /// a local directory that does not exist.
    pub fn new(host: Arc<dyn AssetHost>, policy: PublishPolicy) -> PublishResult<Self> {
        let transport = transport::select(host.base_path())?;
        let locks = policy.lock_dir.clone().map(LockManager::new);
        info!(
            base_path = %host.base_path(),
            base_url = %host.base_url(),
            transport = transport.kind().as_str(),
            locking = locks.is_some(),
            "publish coordinator ready"
        );
        Ok(Self {
            host,
            policy,
            transport,
            locks,
            cache: Arc::new(PublishCache::new()),
            metrics: None,
        })
    }

    /// Build a coordinator from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`PublishCoordinator::new`].
    pub fn from_config(config: &PublishConfig) -> PublishResult<Self> {
        Self::new(Arc::new(config.clone()), PublishPolicy::from(config))
    }

    /// Replace the selected transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Share a result cache with other coordinators.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PublishCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Record publish and transfer counters.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Result cache used by this coordinator.
    #[must_use]
    pub const fn cache(&self) -> &Arc<PublishCache> {
        &self.cache
    }

    /// Transport family in use.
    #[must_use]
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Lock marker store, when locking is enabled.
    #[must_use]
    pub const fn locks(&self) -> Option<&LockManager> {
        self.locks.as_ref()
    }

    /// Publish an asset and return its public address.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::NotFound`] when the source is missing and a
    /// transfer or sync error when the destination cannot be written.
    pub fn publish(&self, request: &AssetRequest) -> PublishResult<String> {
        self.publish_asset(request)
            .map(|asset| asset.public_address)
    }

    /// Publish an asset and return the full result record.
    ///
    /// # Errors
    ///
    /// See [`PublishCoordinator::publish`].
    pub fn publish_asset(&self, request: &AssetRequest) -> PublishResult<PublishedAsset> {
        let _span = info_span!("publish", source = %request.source_path.display()).entered();
        if let Some(hit) = self.cache.get(&request.source_path) {
            debug!(address = %hit.public_address, "publish cache hit");
            self.record_publish(hit.kind.as_str(), "cached");
            return Ok(hit);
        }

        let not_found = || PublishError::NotFound {
            path: request.source_path.clone(),
        };
        let source = fs::canonicalize(&request.source_path).map_err(|_| not_found())?;
        let metadata = fs::metadata(&source).map_err(|_| not_found())?;
        let kind = if metadata.is_file() {
            AssetKind::File
        } else if metadata.is_dir() {
            AssetKind::Directory
        } else {
            return Err(not_found());
        };

        if let Some(locks) = &self.locks
            && let Err(err) = locks.prepare()
        {
            self.record_lock_failure(&err);
        }

        let result = match kind {
            AssetKind::File => self.publish_file(request, &source, &metadata),
            AssetKind::Directory => self.publish_directory(request, &source),
        };
        match result {
            Ok((asset, outcome)) => {
                info!(
                    source = %request.source_path.display(),
                    kind = kind.as_str(),
                    outcome = outcome.as_str(),
                    address = %asset.public_address,
                    "asset published"
                );
                self.record_publish(kind.as_str(), outcome.as_str());
                self.cache.insert(asset.clone());
                Ok(asset)
            }
            Err(err) => {
                warn!(
                    source = %request.source_path.display(),
                    kind = kind.as_str(),
                    error = %err,
                    "asset publish failed"
                );
                self.record_publish(kind.as_str(), "failed");
                Err(err)
            }
        }
    }

    fn publish_file(
        &self,
        request: &AssetRequest,
        source: &Path,
        metadata: &Metadata,
    ) -> PublishResult<(PublishedAsset, Outcome)> {
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| PublishError::NotFound {
                path: request.source_path.clone(),
            })?;
        let dest_dir = hash::destination_dir(AssetKind::File, source, request.hash_by_name);
        let lock_key = format!("{dest_dir}-{file_name}");

        let outcome = if self.is_locked(&lock_key) {
            Outcome::Locked
        } else {
            let outcome = if self.links_enabled() {
                self.ensure_dir(source, &dest_dir)?;
                self.link(source, &join_path(&dest_dir, &file_name))?
            } else {
                self.copy_if_stale(source, metadata, &dest_dir, &file_name)?
            };
            self.commit_lock(&lock_key);
            outcome
        };

        let public_address = format!("{}/{dest_dir}/{file_name}", self.host.base_url());
        Ok((
            PublishedAsset {
                source_path: request.source_path.clone(),
                kind: AssetKind::File,
                destination_dir: dest_dir,
                public_address,
            },
            outcome,
        ))
    }

    fn publish_directory(
        &self,
        request: &AssetRequest,
        source: &Path,
    ) -> PublishResult<(PublishedAsset, Outcome)> {
        let dest_dir = hash::destination_dir(AssetKind::Directory, source, request.hash_by_name);

        let outcome = if self.is_locked(&dest_dir) {
            Outcome::Locked
        } else {
            let outcome = if self.links_enabled() {
                self.link(source, &dest_dir)?
            } else if request.force_copy || !self.dir_exists(source, &dest_dir)? {
                self.sync_directory(request, source, &dest_dir)?;
                Outcome::Synced
            } else {
                Outcome::Present
            };
            self.commit_lock(&dest_dir);
            outcome
        };

        let public_address = format!("{}/{dest_dir}", self.host.base_url());
        Ok((
            PublishedAsset {
                source_path: request.source_path.clone(),
                kind: AssetKind::Directory,
                destination_dir: dest_dir,
                public_address,
            },
            outcome,
        ))
    }

    fn copy_if_stale(
        &self,
        source: &Path,
        metadata: &Metadata,
        dest_dir: &str,
        file_name: &str,
    ) -> PublishResult<Outcome> {
        let source_mtime = metadata.modified().map_err(|err| {
            PublishError::transfer(source, TransferError::io("publish.source_mtime", source, err))
        })?;
        let dest_mtime = self
            .transport
            .modified(dest_dir, file_name)
            .map_err(|err| PublishError::transfer(source, err))?;
        if dest_mtime.is_some_and(|dest| dest >= source_mtime) {
            debug!(source = %source.display(), dest = %dest_dir, "destination is fresh");
            return Ok(Outcome::Fresh);
        }

        self.ensure_dir(source, dest_dir)?;
        let transport = self.transport.kind().as_str();
        let bytes = match self.transport.copy_file(source, dest_dir, file_name) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.record_transfer(transport, "failed", 0);
                return Err(PublishError::transfer(source, err));
            }
        };
        self.record_transfer(transport, "ok", bytes);

        if !self.transport.kind().is_remote()
            && let Some(mode) = self.host.file_mode()
            && let Err(err) = self.transport.set_file_mode(dest_dir, file_name, mode)
        {
            warn!(
                source = %source.display(),
                mode = %format!("0o{mode:o}"),
                error = %err,
                "failed to apply file mode"
            );
        }
        Ok(Outcome::Copied)
    }

    fn sync_directory(
        &self,
        request: &AssetRequest,
        source: &Path,
        dest_dir: &str,
    ) -> PublishResult<()> {
        let spec = CopySpec {
            file_types: self.policy.file_types.clone(),
            exclusions: self.policy.exclusions.clone(),
            depth_limit: request.depth_limit,
            new_dir_mode: self.host.dir_mode(),
            new_file_mode: self.host.file_mode(),
            is_remote: self.transport.kind().is_remote(),
        };
        let synchronizer = DirectorySynchronizer::new(self.transport.as_ref(), &spec);
        let synchronizer = match &self.metrics {
            Some(metrics) => synchronizer.with_metrics(metrics),
            None => synchronizer,
        };
        let report = synchronizer
            .sync(source, dest_dir, "")
            .map_err(|err| PublishError::Sync {
                asset: source.to_path_buf(),
                source: err,
            })?;
        debug!(
            source = %source.display(),
            files = report.files_copied,
            dirs = report.dirs_created,
            skipped = report.entries_skipped,
            bytes = report.bytes_copied,
            "directory published"
        );
        Ok(())
    }

    fn ensure_dir(&self, source: &Path, dest_dir: &str) -> PublishResult<()> {
        self.transport
            .ensure_dir(dest_dir, self.host.dir_mode())
            .map_err(|err| PublishError::transfer(source, err))
    }

    fn dir_exists(&self, source: &Path, dest_dir: &str) -> PublishResult<bool> {
        self.transport
            .dir_exists(dest_dir)
            .map_err(|err| PublishError::transfer(source, err))
    }

    fn link(&self, source: &Path, target: &str) -> PublishResult<Outcome> {
        let created = self
            .transport
            .link(source, target)
            .map_err(|err| PublishError::transfer(source, err))?;
        Ok(if created {
            Outcome::Linked
        } else {
            Outcome::Present
        })
    }

    fn links_enabled(&self) -> bool {
        self.policy.link_assets && !self.transport.kind().is_remote()
    }

    fn is_locked(&self, key: &str) -> bool {
        let locked = self.locks.as_ref().is_some_and(|locks| locks.is_locked(key));
        if locked {
            debug!(key = %key, "asset locked; skipping destination checks");
        }
        locked
    }

    fn commit_lock(&self, key: &str) {
        if let Some(locks) = &self.locks
            && let Err(err) = locks.lock(key)
        {
            self.record_lock_failure(&err);
        }
    }

    fn record_lock_failure(&self, err: &LockError) {
        warn!(error = %err, detail = ?err, "lock marker unavailable; continuing without it");
        if let Some(metrics) = &self.metrics {
            metrics.inc_lock_failure();
        }
    }

    fn record_publish(&self, kind: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_publish(kind, outcome);
        }
    }

    fn record_transfer(&self, transport: &str, status: &str, bytes: u64) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_transfer(transport, status);
            metrics.add_bytes_transferred(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use hoist_test_support::fixtures::{TempRoot, advance_mtime, relative_files};
    use std::time::Duration;

    struct Fixture {
        src: TempRoot,
        dst: TempRoot,
        config: PublishConfig,
    }

    impl Fixture {
        fn new() -> Result<Self> {
            let src = TempRoot::new("hoist-svc-src-")?;
            let dst = TempRoot::new("hoist-svc-dst-")?;
            let config = PublishConfig::new(
                dst.path().to_string_lossy().into_owned(),
                "http://cdn.test/assets",
            );
            Ok(Self { src, dst, config })
        }

        fn coordinator(&self) -> PublishResult<PublishCoordinator> {
            PublishCoordinator::from_config(&self.config)
        }
    }

    #[test]
    fn file_address_uses_parent_hash() -> Result<()> {
        let fixture = Fixture::new()?;
        let file = fixture.src.write("css/app.css", "body{}")?;
        let coordinator = fixture.coordinator()?;

        let address = coordinator.publish(&AssetRequest::new(&file))?;
        let canonical = fs::canonicalize(&file)?;
        let parent = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        let expected_dir = hash::destination_name(&parent.to_string_lossy());
        assert_eq!(
            address,
            format!("http://cdn.test/assets/{expected_dir}/app.css")
        );
        assert_eq!(
            relative_files(fixture.dst.path())?,
            vec![format!("{expected_dir}/app.css")]
        );
        Ok(())
    }

    #[test]
    fn missing_source_is_not_found() -> Result<()> {
        let fixture = Fixture::new()?;
        let coordinator = fixture.coordinator()?;
        let err = coordinator
            .publish(&AssetRequest::new(fixture.src.path().join("absent.js")))
            .err();
        assert!(err.is_some_and(|err| err.is_not_found()));
        assert!(coordinator.cache().is_empty());
        Ok(())
    }

    #[test]
    fn stale_destination_is_recopied() -> Result<()> {
        let fixture = Fixture::new()?;
        let file = fixture.src.write("app.js", "v1")?;
        PublishCoordinator::from_config(&fixture.config)?.publish(&AssetRequest::new(&file))?;

        fs::write(&file, "v2")?;
        advance_mtime(&file, Duration::from_secs(120))?;
        let address = fixture
            .coordinator()?
            .publish(&AssetRequest::new(&file))?;
        let dir = address
            .rsplit('/')
            .nth(1)
            .map(str::to_string)
            .unwrap_or_default();
        assert_eq!(
            fs::read_to_string(fixture.dst.path().join(dir).join("app.js"))?,
            "v2"
        );
        Ok(())
    }

    #[test]
    fn hash_by_name_uses_basename() -> Result<()> {
        let fixture = Fixture::new()?;
        let dir = fixture.src.mkdir("widgets")?;
        fixture.src.write("widgets/w.js", "w")?;
        let coordinator = fixture.coordinator()?;

        let asset = coordinator
            .publish_asset(&AssetRequest::new(&dir).with_hash_by_name(true))?;
        assert_eq!(asset.destination_dir, hash::destination_name("widgets"));
        assert!(
            fixture
                .dst
                .path()
                .join(&asset.destination_dir)
                .join("w.js")
                .is_file()
        );
        Ok(())
    }

    #[test]
    fn locking_writes_markers_under_configured_dir() -> Result<()> {
        let mut fixture = Fixture::new()?;
        fixture.config.lock.enabled = true;
        fixture.config.lock.path = fixture.src.path().join("locks");
        let file = fixture.src.write("assets/app.js", "1")?;
        let dir = fixture.src.mkdir("assets")?;
        let coordinator = fixture.coordinator()?;

        let file_asset = coordinator.publish_asset(&AssetRequest::new(&file))?;
        let dir_asset = coordinator.publish_asset(&AssetRequest::new(&dir))?;
        let locks = coordinator.locks().map(LockManager::list).transpose()?;
        let mut expected = vec![
            format!("{}-app.js", file_asset.destination_dir),
            dir_asset.destination_dir,
        ];
        expected.sort();
        assert_eq!(locks.unwrap_or_default(), expected);
        Ok(())
    }

    #[test]
    fn unusable_lock_dir_does_not_fail_publish() -> Result<()> {
        let mut fixture = Fixture::new()?;
        let blocker = fixture.src.write("blocker", "file")?;
        fixture.config.lock.enabled = true;
        fixture.config.lock.path = blocker;
        let file = fixture.src.write("app.js", "1")?;
        let metrics = Metrics::new()?;
        let coordinator = fixture.coordinator()?.with_metrics(metrics.clone());

        coordinator.publish(&AssetRequest::new(&file))?;
        assert!(metrics.snapshot().lock_failures_total >= 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn link_assets_creates_symlinks() -> Result<()> {
        let mut fixture = Fixture::new()?;
        fixture.config.link_assets = true;
        let file = fixture.src.write("lib/app.js", "1")?;
        let dir = fixture.src.mkdir("lib")?;
        let coordinator = fixture.coordinator()?;

        let asset = coordinator.publish_asset(&AssetRequest::new(&file))?;
        let link = fixture
            .dst
            .path()
            .join(&asset.destination_dir)
            .join("app.js");
        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());

        let dir_asset = coordinator.publish_asset(&AssetRequest::new(&dir).with_hash_by_name(true))?;
        let dir_link = fixture.dst.path().join(&dir_asset.destination_dir);
        assert!(fs::symlink_metadata(&dir_link)?.file_type().is_symlink());
        Ok(())
    }

    #[test]
    fn metrics_record_outcomes() -> Result<()> {
        let fixture = Fixture::new()?;
        let file = fixture.src.write("app.js", "12345")?;
        let metrics = Metrics::new()?;
        let coordinator = fixture.coordinator()?.with_metrics(metrics.clone());

        coordinator.publish(&AssetRequest::new(&file))?;
        coordinator.publish(&AssetRequest::new(&file))?;
        let rendered = metrics.render()?;
        assert!(rendered.contains(r#"hoist_publish_total{kind="file",outcome="copied"} 1"#));
        assert!(rendered.contains(r#"hoist_publish_total{kind="file",outcome="cached"} 1"#));
        assert_eq!(metrics.snapshot().bytes_transferred_total, 5);
        Ok(())
    }
}
