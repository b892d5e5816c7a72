//! `hoist publish`: publish assets and print their addresses.

use hoist_config::PublishConfig;
use hoist_publish::{AssetRequest, PublishCoordinator};
use hoist_telemetry::Metrics;
use tracing::debug;

use crate::cli::PublishArgs;
use crate::error::{CliError, CliResult};
use crate::output::{PublishedRow, render_published};

pub(crate) fn handle(config: &PublishConfig, args: &PublishArgs) -> CliResult<String> {
    let mut coordinator = PublishCoordinator::from_config(config)?;
    let metrics = if args.metrics {
        let metrics = Metrics::new().map_err(CliError::failure)?;
        coordinator = coordinator.with_metrics(metrics.clone());
        Some(metrics)
    } else {
        None
    };
    let mut rows = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let request = AssetRequest::new(path)
            .with_hash_by_name(args.hash_by_name)
            .with_depth_limit(args.level)
            .with_force_copy(args.force_copy);
        let address = coordinator.publish(&request)?;
        debug!(source = %path.display(), address = %address, "published from cli");
        rows.push(PublishedRow {
            source: path.display().to_string(),
            address,
        });
    }
    if let Some(metrics) = metrics {
        eprint!("{}", metrics.render().map_err(CliError::failure)?);
    }
    render_published(&rows, args.format)
}
