//! Process-lifetime memo of published assets keyed by requested source path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::error;

use crate::model::PublishedAsset;

/// Thread-safe map from requested source path to its publish result.
///
/// Keys are the paths exactly as callers passed them; no normalisation or
/// filesystem access happens on lookup. Entries never expire.
#[derive(Debug, Default)]
pub struct PublishCache {
    entries: Mutex<HashMap<PathBuf, PublishedAsset>>,
}

impl PublishCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a source path.
    #[must_use]
    pub fn get(&self, source_path: &Path) -> Option<PublishedAsset> {
        self.entries().get(source_path).cloned()
    }

    /// Remember a result, replacing any earlier entry for the same path.
    pub fn insert(&self, asset: PublishedAsset) {
        self.entries().insert(asset.source_path.clone(), asset);
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Forget every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, PublishedAsset>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("publish cache mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}
