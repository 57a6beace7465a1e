//! Cache inspection commands.

use wpsync_core::cache::CacheStore;
use wpsync_core::fs::RealFileSystem;

use super::args::CacheCommands;
use super::output::Output;
use super::{CliError, resolve_cache_dir};

pub fn handle_cache_command(output: &Output, command: CacheCommands) -> Result<(), CliError> {
    match command {
        CacheCommands::List { cache_dir } => {
            let cache = CacheStore::new(RealFileSystem, resolve_cache_dir(cache_dir)?);
            output.cached_posts(&cache.list()?);
        }
        CacheCommands::Show { id, cache_dir } => {
            let cache = CacheStore::new(RealFileSystem, resolve_cache_dir(cache_dir)?);
            let snapshot = cache.get(id)?.ok_or(CliError::NotCached(id))?;
            output.cached_post(&snapshot, &cache.paths_for(id)?);
        }
    }
    Ok(())
}
