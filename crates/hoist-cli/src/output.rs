//! Output renderers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// One published asset as reported to the operator.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PublishedRow {
    pub(crate) source: String,
    pub(crate) address: String,
}

pub(crate) fn render_published(rows: &[PublishedRow], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(rows),
        OutputFormat::Text => Ok(rows
            .iter()
            .map(|row| format!("{} -> {}", row.source, row.address))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub(crate) fn render_locks(keys: &[String], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(keys),
        OutputFormat::Text if keys.is_empty() => Ok("no lock markers".to_string()),
        OutputFormat::Text => Ok(keys.join("\n")),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
