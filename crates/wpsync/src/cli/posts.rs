//! Post commands that talk to the site directly.
//!
//! Only `create` touches the cache: the new post is saved as its baseline so
//! the next sync treats it like any other cached post. Updates and deletions
//! made here reach the cache through the next sync.

use wpsync_core::cache::{CacheLock, CacheStore};
use wpsync_core::error::WpSyncError;
use wpsync_core::fs::RealFileSystem;
use wpsync_core::post::PostUpdate;
use wpsync_core::sync::{PostGateway, SyncEngine};

use super::args::{BodyArgs, PostsCommands, TermArgs};
use super::output::Output;
use super::{CliError, connect, runtime};

pub fn handle_posts_command(output: &Output, command: PostsCommands) -> Result<(), CliError> {
    let (config, gateway) = connect()?;
    let runtime = runtime()?;

    match command {
        PostsCommands::List {
            status,
            per_page,
            page,
        } => {
            let posts = runtime
                .block_on(gateway.list_posts(&status, per_page, page))
                .map_err(|e| WpSyncError::gateway("list posts", None, e))?;
            output.posts(&posts);
        }
        PostsCommands::Get { id } => {
            let post = runtime
                .block_on(gateway.get_post(id))
                .map_err(|e| WpSyncError::gateway("fetch post", Some(id), e))?;
            output.post(&post);
        }
        PostsCommands::Create {
            title,
            body,
            status,
            terms,
            cache_dir,
        } => {
            let mut draft = PostUpdate {
                title: Some(title),
                content: read_body(body)?,
                status: Some(status),
                ..Default::default()
            };
            apply_terms(&mut draft, terms);

            let cache_dir = cache_dir.unwrap_or(config.cache_dir);
            let _lock = CacheLock::acquire(&cache_dir)?;
            let engine = SyncEngine::new(&gateway, CacheStore::new(RealFileSystem, cache_dir));
            let snapshot = runtime.block_on(engine.create(&draft))?;
            output.post(&snapshot.post);
        }
        PostsCommands::Update {
            id,
            title,
            body,
            status,
            terms,
        } => {
            let mut update = PostUpdate {
                title,
                content: read_body(body)?,
                status,
                ..Default::default()
            };
            apply_terms(&mut update, terms);
            if update.is_empty() {
                return Err(CliError::NothingToUpdate);
            }

            let post = runtime
                .block_on(gateway.update_post(id, &update))
                .map_err(|e| WpSyncError::gateway("update post", Some(id), e))?;
            output.post(&post);
        }
        PostsCommands::Delete { id, trash } => {
            let force = !trash;
            let post = runtime
                .block_on(gateway.delete_post(id, force))
                .map_err(|e| WpSyncError::gateway("delete post", Some(id), e))?;
            output.deleted_post(&post, force);
        }
    }
    Ok(())
}

/// Body from `--content` or `--content-file`, if either was given.
fn read_body(body: BodyArgs) -> Result<Option<String>, CliError> {
    match (body.content, body.content_file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| CliError::ContentFile { path, source }),
        (None, None) => Ok(None),
    }
}

fn apply_terms(update: &mut PostUpdate, terms: TermArgs) {
    update.categories = (!terms.categories.is_empty()).then_some(terms.categories);
    update.tags = (!terms.tags.is_empty()).then_some(terms.tags);
    update.featured_media = terms.featured_media;
}
