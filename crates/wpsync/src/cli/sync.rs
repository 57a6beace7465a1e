//! Sync command handlers.

use std::path::PathBuf;

use wpsync_core::cache::{CacheLock, CacheStore};
use wpsync_core::fs::RealFileSystem;
use wpsync_core::sync::{CancelFlag, local_status, synchronize};

use super::output::Output;
use super::{CliError, connect, resolve_cache_dir, runtime};

/// Run one pass against the configured site. Ctrl-C stops it after the current post.
pub fn handle_sync(
    output: &Output,
    cache_dir: Option<PathBuf>,
    limit: Option<u32>,
) -> Result<(), CliError> {
    let (config, gateway) = connect()?;
    let cache_dir = cache_dir.unwrap_or_else(|| config.cache_dir.clone());
    let mut options = config.sync_options();
    if let Some(limit) = limit {
        options.window_size = limit;
    }

    log::info!(
        "Syncing {} into {}",
        config.base_url,
        cache_dir.display()
    );

    let runtime = runtime()?;
    let cancel = CancelFlag::new();

    let report = runtime.block_on(async {
        let flag = cancel.clone();

        // Set up Ctrl+C handler inside the async context
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nStopping after the current post...");
                    flag.cancel();
                }
                Err(e) => {
                    log::warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        synchronize(&gateway, &cache_dir, &options, &cancel).await
    })?;

    output.sync_report(&report);
    Ok(())
}

/// Report local edits without contacting the site.
pub fn handle_status(output: &Output, cache_dir: Option<PathBuf>) -> Result<(), CliError> {
    let cache_dir = resolve_cache_dir(cache_dir)?;
    let _lock = CacheLock::acquire(&cache_dir)?;
    let cache = CacheStore::new(RealFileSystem, cache_dir.clone());
    cache.recover()?;
    let statuses = local_status(&cache)?;
    output.local_status(&statuses);
    Ok(())
}
