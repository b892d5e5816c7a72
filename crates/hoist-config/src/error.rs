//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("configuration io failure")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration document was not valid TOML or had unexpected fields.
    #[error("configuration parse failure")]
    Parse {
        /// Path of the configuration file, when loaded from disk.
        path: Option<PathBuf>,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: Option<&str>) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: value.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_helper_captures_context() {
        let err = ConfigError::invalid("dir_mode", "invalid_octal", Some("0o9"));
        match err {
            ConfigError::InvalidField {
                field,
                reason,
                value,
            } => {
                assert_eq!(field, "dir_mode");
                assert_eq!(reason, "invalid_octal");
                assert_eq!(value.as_deref(), Some("0o9"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn io_variant_exposes_source() {
        let err = ConfigError::Io {
            path: PathBuf::from("hoist.toml"),
            source: io::Error::other("io"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "configuration io failure");
    }
}
