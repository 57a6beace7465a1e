/// Clap argument definitions
mod args;

/// `cache list` and `cache show`
mod cache;

/// Config command handlers
mod config;

/// Text and JSON rendering
mod output;

/// `posts` commands
mod posts;

/// `sync` and `status`
mod sync;

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use wpsync_core::config::Config;
use wpsync_core::error::WpSyncError;
use wpsync_core::post::PostId;

use crate::rest::RestGateway;
pub use args::Cli;
use args::Commands;
use output::Output;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] WpSyncError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Post {0} is not cached")]
    NotCached(PostId),

    #[error(
        "No bearer token configured. Set WPSYNC_TOKEN or run 'wpsync config init --token <TOKEN>'"
    )]
    MissingToken,

    #[error("Failed to read {path}: {source}")]
    ContentFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to update; pass at least one field")]
    NothingToUpdate,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(
                WpSyncError::NoConfigDir
                | WpSyncError::ConfigNotInitialized
                | WpSyncError::ConfigParse(_),
            )
            | CliError::MissingToken => 2,
            CliError::Core(WpSyncError::Gateway { .. }) => 3,
            CliError::Core(WpSyncError::CacheLocked(_)) => 4,
            CliError::NotCached(_)
            | CliError::ContentFile { .. }
            | CliError::NothingToUpdate => 1,
            _ => 99,
        }
    }
}

/// Main entry point for the CLI; returns the process exit code
pub fn run_cli() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { 1 } else { 0 };
        }
    };

    init_logging(cli.verbose);
    let output = Output::new(cli.json);

    let result = match cli.command {
        Commands::Sync { cache_dir, limit } => sync::handle_sync(&output, cache_dir, limit),
        Commands::Status { cache_dir } => sync::handle_status(&output, cache_dir),
        Commands::Posts { command } => posts::handle_posts_command(&output, command),
        Commands::Cache { command } => cache::handle_cache_command(&output, command),
        Commands::Config { command } => config::handle_config_command(&output, command),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            output.error(&e);
            e.exit_code()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Cache root: the `--cache-dir` override, else the configured one.
fn resolve_cache_dir(cache_dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cache_dir {
        Some(dir) => Ok(dir),
        None => Ok(Config::load()?.cache_dir),
    }
}

/// Load the config and build an authenticated gateway for it.
///
/// Every remote call reads with `context=edit`, which WordPress only serves to
/// authenticated users, so a missing token fails here.
fn connect() -> Result<(Config, RestGateway), CliError> {
    let config = Config::load()?;
    let token = config.token().ok_or(CliError::MissingToken)?;
    let gateway = RestGateway::new(&config.base_url, Some(token))?;
    Ok((config, gateway))
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new().map_err(CliError::Runtime)
}
