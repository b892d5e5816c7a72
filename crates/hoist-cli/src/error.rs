//! CLI error type and exit codes.

use std::fmt::{self, Display, Formatter};

use hoist_publish::PublishError;

/// Error raised by command handlers.
#[derive(Debug)]
pub(crate) enum CliError {
    /// Bad input from the operator; exit code 2.
    Validation(String),
    /// Runtime failure; exit code 3.
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<PublishError> for CliError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::NotFound { path } => {
                Self::validation(format!("asset not found: {}", path.display()))
            }
            PublishError::UnsupportedScheme { scheme } => {
                Self::validation(format!("unsupported destination scheme: {scheme}"))
            }
            PublishError::InvalidBasePath { path, reason } => {
                Self::validation(format!("invalid base_path {path}: {reason}"))
            }
            other => Self::failure(other),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn publish_errors_map_to_exit_codes() {
        let missing = CliError::from(PublishError::NotFound {
            path: PathBuf::from("/srv/missing.css"),
        });
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(
            missing.display_message(),
            "asset not found: /srv/missing.css"
        );

        let failed = CliError::from(PublishError::Transfer {
            asset: PathBuf::from("/srv/app.css"),
            source: hoist_publish::TransferError::Unsupported {
                operation: "link",
                transport: "ftp",
            },
        });
        assert_eq!(failed.exit_code(), 3);
        assert!(failed.display_message().starts_with("asset transfer failed"));
    }
}
