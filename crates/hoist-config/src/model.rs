//! Configuration models.
//!
//! # Design
//! - `ConfigDocument` mirrors the on-disk TOML shape; every field is optional.
//! - `PublishConfig` is the validated, fully-typed form consumed by the engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Raw configuration document as written in `hoist.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDocument {
    /// Local directory or `ftp://` address receiving published assets.
    pub base_path: String,
    /// Public URL prefix for published assets.
    pub base_url: Option<String>,
    /// Host used to derive `base_url` when it is not set explicitly.
    pub host: Option<String>,
    /// Whether the derived `base_url` uses `https`.
    pub secure: bool,
    /// Path segment appended to the host when deriving `base_url`.
    pub url_path: Option<String>,
    /// Octal permission mode applied to copied files.
    pub file_mode: Option<String>,
    /// Octal permission mode applied to created directories.
    pub dir_mode: Option<String>,
    /// Exclusion tokens (names or relative sub-paths).
    pub exclude: Option<Vec<String>>,
    /// File suffixes (without the dot) eligible for directory publishing.
    pub file_types: Vec<String>,
    /// Publish local assets as symbolic links instead of copies.
    pub link_assets: bool,
    /// Lock marker settings.
    pub lock: LockDocument,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Raw `[lock]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockDocument {
    /// Whether published assets are frozen with lock markers.
    pub enabled: bool,
    /// Directory holding lock markers.
    pub path: Option<PathBuf>,
}

/// Logging section shared by the raw and validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level filter (overridden by `RUST_LOG`).
    pub level: String,
    /// Output format; inferred from the build profile when absent.
    pub format: Option<LogFormatSetting>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Log output formats accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Lock marker settings after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockConfig {
    /// Whether published assets are frozen with lock markers.
    pub enabled: bool,
    /// Directory holding lock markers.
    pub path: PathBuf,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from(defaults::LOCK_DIR),
        }
    }
}

/// Validated publisher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Local directory or remote address receiving published assets.
    pub base_path: String,
    /// Public URL prefix, without a trailing slash.
    pub base_url: String,
    /// Permission mode applied to copied files, if any.
    pub file_mode: Option<u32>,
    /// Permission mode applied to created directories.
    pub dir_mode: u32,
    /// Exclusion tokens applied during directory publishing.
    pub exclude: Vec<String>,
    /// File suffixes eligible for directory publishing; empty means all.
    pub file_types: Vec<String>,
    /// Publish local assets as symbolic links instead of copies.
    pub link_assets: bool,
    /// Lock marker settings.
    pub lock: LockConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl PublishConfig {
    /// Build a configuration with default settings for the given destination and URL.
    #[must_use]
    pub fn new(base_path: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_path: base_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            file_mode: None,
            dir_mode: defaults::DIR_MODE,
            exclude: defaults::exclude(),
            file_types: Vec::new(),
            link_assets: false,
            lock: LockConfig::default(),
            logging: LoggingSettings::default(),
        }
    }

    /// Whether the destination is addressed through a URI scheme.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.base_path.contains("://")
    }
}
