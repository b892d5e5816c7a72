//! TOML configuration loading.
//!
//! # Design
//! - Parse into the permissive [`ConfigDocument`] first, then validate.
//! - Resolve relative local paths against the directory holding the file.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, PublishConfig};
use crate::validate::normalize;

/// Load and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or fails validation.
pub fn load_from_path(path: &Path) -> ConfigResult<PublishConfig> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: ConfigDocument = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let relative_to = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    let config = normalize(doc, relative_to)?;
    debug!(
        path = %path.display(),
        base_path = %config.base_path,
        base_url = %config.base_url,
        lock_enabled = config.lock.enabled,
        "loaded publish configuration"
    );
    Ok(config)
}

/// Parse and validate a configuration document held in memory.
///
/// # Errors
///
/// Returns an error if the document is not valid TOML or fails validation.
pub fn load_from_str(raw: &str) -> ConfigResult<PublishConfig> {
    let doc: ConfigDocument =
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
    normalize(doc, None)
}
