//! `hoist locks`: inspect and clear lock markers.

use hoist_config::PublishConfig;
use hoist_publish::LockManager;
use tracing::info;

use crate::cli::{LocksClearArgs, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output::render_locks;

pub(crate) fn handle_list(config: &PublishConfig, format: OutputFormat) -> CliResult<String> {
    let manager = LockManager::new(&config.lock.path);
    let keys = manager.list().map_err(CliError::failure)?;
    render_locks(&keys, format)
}

pub(crate) fn handle_clear(config: &PublishConfig, args: &LocksClearArgs) -> CliResult<String> {
    if !args.all && args.keys.is_empty() {
        return Err(CliError::validation("pass lock keys or --all"));
    }
    let manager = LockManager::new(&config.lock.path);
    let keys = if args.all {
        manager.list().map_err(CliError::failure)?
    } else {
        args.keys.clone()
    };

    let mut removed = 0_usize;
    let mut missing = Vec::new();
    for key in &keys {
        if manager.unlock(key).map_err(CliError::failure)? {
            removed += 1;
        } else {
            missing.push(key.as_str());
        }
    }
    info!(removed, dir = %manager.dir().display(), "lock markers cleared");

    let mut output = format!("removed {removed} lock marker(s)");
    if !missing.is_empty() {
        output.push_str(&format!("\nnot locked: {}", missing.join(", ")));
    }
    Ok(output)
}
