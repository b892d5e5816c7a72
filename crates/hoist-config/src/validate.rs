//! Validation helpers and parsing utilities for configuration documents.

use std::path::Path;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, LockConfig, PublishConfig};

/// Validate a raw document and convert it into a [`PublishConfig`].
///
/// Relative local paths (`base_path`, `lock.path`) are resolved against
/// `relative_to` when provided, typically the directory holding the file.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when a field is empty, malformed,
/// or when no public URL can be determined.
pub fn normalize(doc: ConfigDocument, relative_to: Option<&Path>) -> ConfigResult<PublishConfig> {
    let base_path = doc.base_path.trim();
    if base_path.is_empty() {
        return Err(ConfigError::invalid("base_path", "empty", None));
    }
    let base_path = if base_path.contains("://") {
        base_path.to_string()
    } else {
        resolve(relative_to, Path::new(base_path))
    };

    let base_url = match (doc.base_url.as_deref(), doc.host.as_deref()) {
        (Some(url), _) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
        (_, Some(host)) if !host.trim().is_empty() => {
            derive_base_url(host.trim(), doc.secure, doc.url_path.as_deref())
        }
        _ => return Err(ConfigError::invalid("base_url", "missing", None)),
    };

    let file_mode = doc
        .file_mode
        .as_deref()
        .map(|value| parse_octal_mode("file_mode", value))
        .transpose()?;
    let dir_mode = doc
        .dir_mode
        .as_deref()
        .map(|value| parse_octal_mode("dir_mode", value))
        .transpose()?
        .unwrap_or(defaults::DIR_MODE);

    let exclude = doc.exclude.unwrap_or_else(defaults::exclude);
    if exclude.iter().any(|token| token.trim().is_empty()) {
        return Err(ConfigError::invalid("exclude", "empty_token", None));
    }
    let file_types = doc
        .file_types
        .into_iter()
        .map(|suffix| suffix.trim().trim_start_matches('.').to_string())
        .collect::<Vec<_>>();
    if file_types.iter().any(String::is_empty) {
        return Err(ConfigError::invalid("file_types", "empty_suffix", None));
    }

    let lock_path = doc
        .lock
        .path
        .unwrap_or_else(|| defaults::LOCK_DIR.into());
    if doc.lock.enabled && lock_path.as_os_str().is_empty() {
        return Err(ConfigError::invalid("lock.path", "empty", None));
    }
    let lock = LockConfig {
        enabled: doc.lock.enabled,
        path: resolve(relative_to, &lock_path).into(),
    };

    Ok(PublishConfig {
        base_path,
        base_url,
        file_mode,
        dir_mode,
        exclude,
        file_types,
        link_assets: doc.link_assets,
        lock,
        logging: doc.logging,
    })
}

/// Parse an octal permission string such as `0o644`, `0644` or `755`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not octal or exceeds `0o7777`.
pub fn parse_octal_mode(field: &'static str, value: &str) -> ConfigResult<u32> {
    let trimmed = value.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(trimmed, 8)
        .map_err(|_| ConfigError::invalid(field, "invalid_octal", Some(value)))?;
    if mode > 0o7777 {
        return Err(ConfigError::invalid(field, "out_of_range", Some(value)));
    }
    Ok(mode)
}

/// Derive the public URL prefix from the serving host.
#[must_use]
pub fn derive_base_url(host: &str, secure: bool, url_path: Option<&str>) -> String {
    let scheme = if secure { "https" } else { "http" };
    let host = host.trim_end_matches('/');
    match url_path.map(|path| path.trim_matches('/')) {
        Some(path) if !path.is_empty() => format!("{scheme}://{host}/{path}"),
        _ => format!("{scheme}://{host}"),
    }
}

fn resolve(relative_to: Option<&Path>, path: &Path) -> String {
    match relative_to {
        Some(base) if path.is_relative() => base.join(path).to_string_lossy().into_owned(),
        _ => path.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LockDocument;
    use std::error::Error;

    type TestResult = Result<(), Box<dyn Error>>;

    fn document() -> ConfigDocument {
        ConfigDocument {
            base_path: "/srv/assets".to_string(),
            base_url: Some("https://cdn.example.com/assets/".to_string()),
            ..ConfigDocument::default()
        }
    }

    #[test]
    fn normalize_applies_defaults() -> TestResult {
        let config = normalize(document(), None)?;
        assert_eq!(config.base_path, "/srv/assets");
        assert_eq!(config.base_url, "https://cdn.example.com/assets");
        assert_eq!(config.dir_mode, defaults::DIR_MODE);
        assert_eq!(config.file_mode, None);
        assert_eq!(config.exclude, defaults::exclude());
        assert!(config.file_types.is_empty());
        assert!(!config.lock.enabled);
        Ok(())
    }

    #[test]
    fn normalize_derives_base_url_from_host() -> TestResult {
        let doc = ConfigDocument {
            base_url: None,
            host: Some("static.example.com".to_string()),
            secure: true,
            url_path: Some("/assets/".to_string()),
            ..document()
        };
        let config = normalize(doc, None)?;
        assert_eq!(config.base_url, "https://static.example.com/assets");
        Ok(())
    }

    #[test]
    fn normalize_requires_some_url_source() {
        let doc = ConfigDocument {
            base_url: None,
            host: None,
            ..document()
        };
        assert!(matches!(
            normalize(doc, None),
            Err(ConfigError::InvalidField {
                field: "base_url",
                ..
            })
        ));
    }

    #[test]
    fn normalize_rejects_empty_base_path() {
        let doc = ConfigDocument {
            base_path: "  ".to_string(),
            ..document()
        };
        assert!(matches!(
            normalize(doc, None),
            Err(ConfigError::InvalidField {
                field: "base_path",
                reason: "empty",
                ..
            })
        ));
    }

    #[test]
    fn normalize_resolves_relative_paths_against_config_dir() -> TestResult {
        let doc = ConfigDocument {
            base_path: "public/assets".to_string(),
            lock: LockDocument {
                enabled: true,
                path: Some("locks".into()),
            },
            ..document()
        };
        let config = normalize(doc, Some(Path::new("/etc/hoist")))?;
        assert_eq!(config.base_path, "/etc/hoist/public/assets");
        assert_eq!(config.lock.path, Path::new("/etc/hoist/locks"));
        Ok(())
    }

    #[test]
    fn normalize_keeps_remote_addresses_verbatim() -> TestResult {
        let doc = ConfigDocument {
            base_path: "ftp://user:pw@ftp.example.com/www/assets".to_string(),
            ..document()
        };
        let config = normalize(doc, Some(Path::new("/etc/hoist")))?;
        assert_eq!(config.base_path, "ftp://user:pw@ftp.example.com/www/assets");
        assert!(config.is_remote());
        Ok(())
    }

    #[test]
    fn normalize_strips_suffix_dots() -> TestResult {
        let doc = ConfigDocument {
            file_types: vec![".js".to_string(), "css".to_string()],
            ..document()
        };
        let config = normalize(doc, None)?;
        assert_eq!(config.file_types, vec!["js".to_string(), "css".to_string()]);
        Ok(())
    }

    #[test]
    fn parse_octal_mode_validates_values() -> TestResult {
        assert_eq!(parse_octal_mode("file_mode", "0o644")?, 0o644);
        assert_eq!(parse_octal_mode("file_mode", "0755")?, 0o755);
        assert!(parse_octal_mode("file_mode", "not-a-mode").is_err());
        assert!(parse_octal_mode("file_mode", "0o89").is_err());
        assert!(parse_octal_mode("file_mode", "0o17777").is_err());
        Ok(())
    }

    #[test]
    fn derive_base_url_handles_missing_path() {
        assert_eq!(
            derive_base_url("example.com", false, None),
            "http://example.com"
        );
        assert_eq!(
            derive_base_url("example.com/", false, Some("/")),
            "http://example.com"
        );
    }
}
