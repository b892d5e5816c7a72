//! Recursive mirroring of a source directory into a destination tree.
//!
//! # Design
//! - Entries are visited in file-name order so repeated runs issue the same
//!   transfers in the same order.
//! - Excluded directories are pruned before descent; their contents are never read.
//! - The first failed transfer aborts the walk. Files copied before the
//!   failure stay in place.

use std::path::Path;

use hoist_telemetry::Metrics;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{SyncError, SyncResult};
use crate::model::CopySpec;
use crate::transport::{Transport, join_path};
use crate::validator::PathValidator;

/// Counters describing one synchronisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files handed to the transport.
    pub files_copied: usize,
    /// Directories ensured at the destination, including the root.
    pub dirs_created: usize,
    /// Entries rejected by the exclusion or suffix rules.
    pub entries_skipped: usize,
    /// Bytes written by the transport.
    pub bytes_copied: u64,
}

/// Mirrors directories through a [`Transport`] according to a [`CopySpec`].
pub struct DirectorySynchronizer<'a> {
    transport: &'a dyn Transport,
    spec: &'a CopySpec,
    metrics: Option<&'a Metrics>,
}

impl<'a> DirectorySynchronizer<'a> {
    /// Synchroniser writing through `transport`.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport, spec: &'a CopySpec) -> Self {
        Self {
            transport,
            spec,
            metrics: None,
        }
    }

    /// Record transfer counters in `metrics`.
    #[must_use]
    pub const fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Mirror `source_dir` into the destination directory `dest_dir`.
    ///
    /// `relative_base` is the path of `source_dir` relative to the root the
    /// exclusion tokens refer to; pass an empty string for a top-level sync.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Walk`] if the source tree cannot be read and
    /// [`SyncError::Transfer`] for the first directory or file that fails.
    pub fn sync(
        &self,
        source_dir: &Path,
        dest_dir: &str,
        relative_base: &str,
    ) -> SyncResult<SyncReport> {
        let mut report = SyncReport::default();
        self.ensure_dir(dest_dir, "")?;
        report.dirs_created += 1;

        let validator = PathValidator::new(&self.spec.file_types, &self.spec.exclusions);
        let mut walker = WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if let Some(max_depth) = self.spec.max_walk_depth() {
            walker = walker.max_depth(max_depth);
        }

        let mut skipped = 0_usize;
        let entries = walker.into_iter().filter_entry(|entry| {
            let admitted = admits(&validator, source_dir, relative_base, entry);
            if !admitted {
                skipped += 1;
            }
            admitted
        });

        for entry in entries {
            let entry = entry.map_err(|source| SyncError::Walk {
                path: source_dir.to_path_buf(),
                source,
            })?;
            let relative = relative_path(source_dir, entry.path());
            let file_type = entry.file_type();
            if file_type.is_dir() {
                if !self.spec.admits_dir_at(entry.depth()) {
                    continue;
                }
                self.ensure_dir(&join_path(dest_dir, &relative), &relative)?;
                report.dirs_created += 1;
            } else if file_type.is_file() {
                let (parent, name) = relative
                    .rsplit_once('/')
                    .unwrap_or(("", relative.as_str()));
                let target_dir = join_path(dest_dir, parent);
                report.bytes_copied += self.copy(entry.path(), &target_dir, name, &relative)?;
                report.files_copied += 1;
            } else {
                debug!(entry = %entry.path().display(), "skipping special file");
            }
        }

        report.entries_skipped = skipped;
        debug!(
            source = %source_dir.display(),
            dest = %dest_dir,
            files = report.files_copied,
            dirs = report.dirs_created,
            skipped = report.entries_skipped,
            "directory synchronised"
        );
        Ok(report)
    }

    fn ensure_dir(&self, dir: &str, relative: &str) -> SyncResult<()> {
        self.transport
            .ensure_dir(dir, self.spec.new_dir_mode)
            .map_err(|source| SyncError::Transfer {
                relative_path: relative.to_string(),
                source,
            })
    }

    fn copy(&self, source: &Path, dir: &str, name: &str, relative: &str) -> SyncResult<u64> {
        let transport = self.transport.kind().as_str();
        let bytes = match self.transport.copy_file(source, dir, name) {
            Ok(bytes) => bytes,
            Err(source) => {
                if let Some(metrics) = self.metrics {
                    metrics.inc_transfer(transport, "failed");
                }
                return Err(SyncError::Transfer {
                    relative_path: relative.to_string(),
                    source,
                });
            }
        };
        if let Some(metrics) = self.metrics {
            metrics.inc_transfer(transport, "ok");
            metrics.add_bytes_transferred(bytes);
        }

        if !self.spec.is_remote
            && let Some(mode) = self.spec.new_file_mode
            && let Err(err) = self.transport.set_file_mode(dir, name, mode)
        {
            warn!(
                file = %relative,
                mode = %format!("0o{mode:o}"),
                error = %err,
                "failed to apply file mode"
            );
        }
        Ok(bytes)
    }
}

fn admits(
    validator: &PathValidator<'_>,
    source_dir: &Path,
    relative_base: &str,
    entry: &DirEntry,
) -> bool {
    let relative = relative_path(source_dir, entry.path());
    let parent = relative.rsplit_once('/').map_or("", |(parent, _)| parent);
    let base = join_path(relative_base, parent);
    let name = entry.file_name().to_string_lossy();
    validator.allows(&base, &name, !entry.file_type().is_dir())
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
