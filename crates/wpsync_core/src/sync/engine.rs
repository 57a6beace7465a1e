//! Sync engine orchestrator.
//!
//! One pass loads the cached snapshots, fetches a bounded window of remote
//! posts, and walks every id in the union of the two, local ids first. Each id
//! is reconciled on its own and yields a [`SyncOutcome`]; the pass loop owns
//! the [`SyncReport`] and files each outcome as it comes back.

use indexmap::IndexMap;

use super::{CancelFlag, MAX_WINDOW_SIZE};
use super::decision::{ChangeSet, SyncAction};
use super::gateway::PostGateway;
use super::report::{SyncOutcome, SyncReport};
use super::status::LocalState;
use crate::cache::{CacheStore, CachedSnapshot};
use crate::error::{Result, WpSyncError};
use crate::fingerprint;
use crate::fs::FileSystem;
use crate::post::{Post, PostId, PostUpdate};

/// Statuses fetched when none are configured.
pub const DEFAULT_STATUSES: [&str; 2] = ["publish", "draft"];

/// The sync engine reconciles the cache with the remote backend.
pub struct SyncEngine<G: PostGateway, FS: FileSystem> {
    gateway: G,
    cache: CacheStore<FS>,
    statuses: Vec<String>,
}

impl<G: PostGateway, FS: FileSystem> SyncEngine<G, FS> {
    /// Create an engine fetching the default statuses.
    pub fn new(gateway: G, cache: CacheStore<FS>) -> Self {
        Self {
            gateway,
            cache,
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fetch these statuses instead, in this order.
    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// The cache this engine writes to.
    pub fn cache(&self) -> &CacheStore<FS> {
        &self.cache
    }

    /// Run one pass.
    ///
    /// `window_size` bounds the posts fetched per status and is clamped to
    /// `1..=100`. Saves left half-done by an earlier pass are settled first.
    /// A gateway failure aborts the pass; writes already made are kept. When
    /// `cancel` is raised the pass stops before the next id and the partial
    /// report comes back with `cancelled` set.
    pub async fn run(&self, window_size: u32, cancel: &CancelFlag) -> Result<SyncReport> {
        let mut report = SyncReport::new();

        self.cache.recover()?;
        let cached = self.cache.list()?;
        let mut remote = self.fetch_window(window_size).await?;
        log::debug!(
            "Sync pass over {} cached and {} remote posts",
            cached.len(),
            remote.len()
        );

        for snapshot in &cached {
            if cancel.is_cancelled() {
                log::info!("Sync cancelled");
                report.cancelled = true;
                return Ok(report);
            }

            let outcome = match remote.shift_remove(&snapshot.id()) {
                Some(post) => self.reconcile(snapshot, post).await?,
                None => self.confirm_outside_window(snapshot).await?,
            };
            report.record(snapshot.id(), outcome);
        }

        // What remains was never cached
        for (id, post) in remote {
            if cancel.is_cancelled() {
                log::info!("Sync cancelled");
                report.cancelled = true;
                return Ok(report);
            }

            self.cache.save(&post)?;
            log::info!("Cached new post {}", id);
            report.record(id, SyncOutcome::NewlyCached);
        }

        Ok(report)
    }

    /// Create a post on the site and cache the server's copy as its baseline.
    pub async fn create(&self, draft: &PostUpdate) -> Result<CachedSnapshot> {
        let post = self
            .gateway
            .create_post(draft)
            .await
            .map_err(|e| WpSyncError::gateway("create post", None, e))?;
        let snapshot = self.cache.save(&post)?;
        log::info!("Created post {}", post.id);
        Ok(snapshot)
    }

    /// First page of every status, merged with the first copy of an id winning.
    async fn fetch_window(&self, window_size: u32) -> Result<IndexMap<PostId, Post>> {
        let per_page = window_size.clamp(1, MAX_WINDOW_SIZE);
        if per_page != window_size {
            log::warn!("Window size {} out of range; using {}", window_size, per_page);
        }

        let mut window = IndexMap::new();
        for status in &self.statuses {
            let posts = self
                .gateway
                .list_posts(status, per_page, 1)
                .await
                .map_err(|e| WpSyncError::gateway("list posts", None, e))?;
            log::debug!("Fetched {} '{}' posts", posts.len(), status);

            for post in posts {
                window.entry(post.id).or_insert(post);
            }
        }
        Ok(window)
    }

    async fn reconcile(&self, baseline: &CachedSnapshot, post: Post) -> Result<SyncOutcome> {
        let local = LocalState::read(&self.cache, baseline.id())?;
        self.apply(baseline, local, post).await
    }

    /// A cached post missing from the window: deleted, or just not in the top N.
    async fn confirm_outside_window(&self, baseline: &CachedSnapshot) -> Result<SyncOutcome> {
        let id = baseline.id();
        let local = LocalState::read(&self.cache, id)?;

        if local.content_changed(baseline) || local.metadata_changed(baseline)? {
            log::debug!("Post {} has local edits but is outside the remote window", id);
            return Ok(SyncOutcome::Deferred);
        }

        match self.gateway.get_post(id).await {
            Ok(post) => self.apply(baseline, local, post).await,
            Err(e) if e.is_not_found() => {
                self.cache.delete(id)?;
                log::info!("Post {} was deleted remotely; removed from cache", id);
                Ok(SyncOutcome::Deleted)
            }
            Err(e) => Err(WpSyncError::gateway("fetch post", Some(id), e)),
        }
    }

    async fn apply(
        &self,
        baseline: &CachedSnapshot,
        local: LocalState,
        post: Post,
    ) -> Result<SyncOutcome> {
        let id = baseline.id();
        let changes = ChangeSet {
            local_content: local.content_changed(baseline),
            local_meta: local.metadata_changed(baseline)?,
            remote_content: fingerprint::content_hash(post.body()) != baseline.content_hash,
            remote_meta: fingerprint::metadata_hash(&post.editable_metadata())?
                != baseline.editable_meta_hash,
        };

        match changes.action() {
            SyncAction::None => {
                log::debug!("Post {} unchanged", id);
                Ok(SyncOutcome::Unchanged)
            }
            SyncAction::Pull => {
                self.cache.save(&post)?;
                log::info!("Pulled post {}", id);
                Ok(SyncOutcome::Pulled)
            }
            SyncAction::Conflict => {
                log::info!("Post {} changed on both sides; left untouched", id);
                Ok(SyncOutcome::Conflicted)
            }
            SyncAction::Push { content, metadata } => {
                let mut update = PostUpdate::default();
                if content {
                    update = update.with_content(local.content);
                }
                if metadata && let Some(meta) = &local.metadata {
                    update = update.with_metadata(meta);
                }

                let updated = self
                    .gateway
                    .update_post(id, &update)
                    .await
                    .map_err(|e| WpSyncError::gateway("update post", Some(id), e))?;
                self.cache.save(&updated)?;
                log::info!("Pushed post {}", id);
                Ok(SyncOutcome::Pushed)
            }
        }
    }
}
