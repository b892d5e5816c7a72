//! Argument parsing, logging setup, and command dispatch.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hoist_config::{LogFormatSetting, PublishConfig, load_from_path};
use hoist_publish::UNLIMITED_DEPTH;
use hoist_telemetry::{LogFormat, LoggingConfig, init_logging};

use crate::commands::{hash, locks, publish};
use crate::error::{CliError, CliResult};

const DEFAULT_CONFIG: &str = "hoist.toml";

/// Parses CLI arguments, executes the requested command, and prints its
/// output. Returns the process exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            0
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn execute(cli: Cli) -> CliResult<String> {
    let config = load_from_path(&cli.config).map_err(|err| {
        CliError::failure(anyhow::Error::new(err).context(format!(
            "failed to load configuration from {}",
            cli.config.display()
        )))
    })?;
    install_logging(&config, cli.log_level.as_deref());
    dispatch(&config, cli.command)
}

pub(crate) fn dispatch(config: &PublishConfig, command: Command) -> CliResult<String> {
    match command {
        Command::Publish(args) => publish::handle(config, &args),
        Command::Hash(args) => hash::handle(config, &args),
        Command::Locks(command) => match command {
            LocksCommand::List(args) => locks::handle_list(config, args.format),
            LocksCommand::Clear(args) => locks::handle_clear(config, &args),
        },
    }
}

fn install_logging(config: &PublishConfig, level_override: Option<&str>) {
    let format = config
        .logging
        .format
        .map_or_else(LogFormat::infer, |format| match format {
            LogFormatSetting::Json => LogFormat::Json,
            LogFormatSetting::Pretty => LogFormat::Pretty,
        });
    let logging = LoggingConfig {
        level: level_override.unwrap_or(&config.logging.level),
        format,
        build_sha: option_env!("HOIST_BUILD_SHA").unwrap_or("dev"),
        ansi: io::stderr().is_terminal(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging unavailable: {err}");
    }
}

#[derive(Parser)]
#[command(name = "hoist", about = "Publish local assets to a web-visible location")]
pub(crate) struct Cli {
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "HOIST_CONFIG",
        default_value = DEFAULT_CONFIG,
        help = "Path to the hoist.toml configuration file"
    )]
    pub(crate) config: PathBuf,
    #[arg(long, global = true, help = "Override the configured log level")]
    pub(crate) log_level: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Publish files or directories and print their public addresses.
    Publish(PublishArgs),
    /// Print the destination name and address an asset would publish to.
    Hash(HashArgs),
    /// Inspect or remove lock markers.
    #[command(subcommand)]
    Locks(LocksCommand),
}

#[derive(Args)]
pub(crate) struct PublishArgs {
    #[arg(required = true, help = "Source files or directories")]
    pub(crate) paths: Vec<PathBuf>,
    #[arg(long, help = "Derive the destination name from the basename only")]
    pub(crate) hash_by_name: bool,
    #[arg(
        long,
        default_value_t = UNLIMITED_DEPTH,
        allow_negative_numbers = true,
        help = "Directory recursion limit (-1 for unlimited, 0 for direct children only)"
    )]
    pub(crate) level: i32,
    #[arg(long, help = "Re-synchronise directories whose destination already exists")]
    pub(crate) force_copy: bool,
    #[arg(long, help = "Write Prometheus publish counters to stderr when done")]
    pub(crate) metrics: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args)]
pub(crate) struct HashArgs {
    #[arg(help = "Source file or directory")]
    pub(crate) path: PathBuf,
    #[arg(long, help = "Derive the destination name from the basename only")]
    pub(crate) hash_by_name: bool,
}

#[derive(Subcommand)]
pub(crate) enum LocksCommand {
    /// List lock marker keys.
    List(LocksListArgs),
    /// Remove lock markers so assets are checked again.
    Clear(LocksClearArgs),
}

#[derive(Args)]
pub(crate) struct LocksListArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args)]
pub(crate) struct LocksClearArgs {
    #[arg(help = "Lock keys to remove")]
    pub(crate) keys: Vec<String>,
    #[arg(long, conflicts_with = "keys", help = "Remove every lock marker")]
    pub(crate) all: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}
