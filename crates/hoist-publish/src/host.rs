//! Destination settings supplied by the hosting application.

use std::path::PathBuf;

use hoist_config::PublishConfig;

/// Where published assets go and how they are addressed.
pub trait AssetHost: Send + Sync {
    /// Local directory or remote address receiving published assets.
    fn base_path(&self) -> &str;

    /// Public URL prefix, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Mode applied to copied files on local destinations.
    fn file_mode(&self) -> Option<u32>;

    /// Mode applied to created directories on local destinations.
    fn dir_mode(&self) -> Option<u32>;
}

impl AssetHost for PublishConfig {
    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn file_mode(&self) -> Option<u32> {
        self.file_mode
    }

    fn dir_mode(&self) -> Option<u32> {
        Some(self.dir_mode)
    }
}

/// Publishing rules independent of the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishPolicy {
    /// Exclusion tokens for directory publishing.
    pub exclusions: Vec<String>,
    /// File suffixes for directory publishing; empty admits all files.
    pub file_types: Vec<String>,
    /// Lock marker directory; `None` disables locking.
    pub lock_dir: Option<PathBuf>,
    /// Publish local assets as symbolic links.
    pub link_assets: bool,
}

impl From<&PublishConfig> for PublishPolicy {
    fn from(config: &PublishConfig) -> Self {
        Self {
            exclusions: config.exclude.clone(),
            file_types: config.file_types.clone(),
            lock_dir: config.lock.enabled.then(|| config.lock.path.clone()),
            link_assets: config.link_assets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reflects_lock_switch() {
        let mut config = PublishConfig::new("/srv/www/assets", "https://cdn.test/assets/");
        config.file_types = vec!["css".into()];
        let policy = PublishPolicy::from(&config);
        assert_eq!(policy.lock_dir, None);
        assert_eq!(policy.file_types, vec!["css"]);
        assert!(policy.exclusions.iter().any(|token| token == ".git"));

        config.lock.enabled = true;
        let locked = PublishPolicy::from(&config);
        assert_eq!(locked.lock_dir, Some(config.lock.path.clone()));
    }

    #[test]
    fn config_acts_as_host() {
        let config = PublishConfig::new("/srv/www/assets", "https://cdn.test/assets/");
        let host: &dyn AssetHost = &config;
        assert_eq!(host.base_url(), "https://cdn.test/assets");
        assert_eq!(host.base_path(), "/srv/www/assets");
        assert_eq!(host.dir_mode(), Some(0o777));
        assert_eq!(host.file_mode(), None);
    }
}
