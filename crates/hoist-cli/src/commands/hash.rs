//! `hoist hash`: show where an asset would be published without copying it.

use std::fs;

use anyhow::anyhow;
use hoist_config::PublishConfig;
use hoist_publish::AssetKind;
use hoist_publish::hash::destination_dir;

use crate::cli::HashArgs;
use crate::error::{CliError, CliResult};

pub(crate) fn handle(config: &PublishConfig, args: &HashArgs) -> CliResult<String> {
    let source = fs::canonicalize(&args.path).map_err(|_| {
        CliError::validation(format!("asset not found: {}", args.path.display()))
    })?;
    let metadata = fs::metadata(&source)
        .map_err(|err| CliError::failure(anyhow!("failed to stat {}: {err}", source.display())))?;
    let kind = if metadata.is_dir() {
        AssetKind::Directory
    } else {
        AssetKind::File
    };
    let dir = destination_dir(kind, &source, args.hash_by_name);
    let address = match (kind, source.file_name()) {
        (AssetKind::File, Some(name)) => {
            format!("{}/{dir}/{}", config.base_url, name.to_string_lossy())
        }
        _ => format!("{}/{dir}", config.base_url),
    };
    Ok(format!("{}\t{dir}\t{address}", kind.as_str()))
}
