//! Outcome of one synchronization pass.

use serde::Serialize;

use crate::post::PostId;

/// What happened to a single post during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local edits were sent to the server
    Pushed,
    /// The server copy replaced the local one
    Pulled,
    /// Deleted remotely; the local copy was removed
    Deleted,
    /// Changed on both sides; left untouched
    Conflicted,
    /// Seen remotely for the first time and cached
    NewlyCached,
    /// Nothing to do
    Unchanged,
    /// Local edits on a post outside the remote window; left for a later pass
    Deferred,
}

/// Ids touched by a pass, grouped by outcome, each list in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Local changes pushed
    pub pushed_to_server: Vec<PostId>,
    /// Remote changes pulled
    pub pulled_from_server: Vec<PostId>,
    /// Removed locally after the server confirmed deletion
    pub deleted_from_local: Vec<PostId>,
    /// Changed on both sides
    pub conflicted: Vec<PostId>,
    /// Cached for the first time
    pub newly_cached: Vec<PostId>,
    /// The pass was cancelled before every post was visited
    pub cancelled: bool,
}

impl SyncReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// File `id` under the list matching `outcome`.
    pub fn record(&mut self, id: PostId, outcome: SyncOutcome) {
        let list = match outcome {
            SyncOutcome::Pushed => &mut self.pushed_to_server,
            SyncOutcome::Pulled => &mut self.pulled_from_server,
            SyncOutcome::Deleted => &mut self.deleted_from_local,
            SyncOutcome::Conflicted => &mut self.conflicted,
            SyncOutcome::NewlyCached => &mut self.newly_cached,
            SyncOutcome::Unchanged | SyncOutcome::Deferred => return,
        };
        list.push(id);
    }

    /// True when no post was touched.
    pub fn is_empty(&self) -> bool {
        self.pushed_to_server.is_empty()
            && self.pulled_from_server.is_empty()
            && self.deleted_from_local.is_empty()
            && self.conflicted.is_empty()
            && self.newly_cached.is_empty()
    }

    /// Number of posts touched.
    pub fn total(&self) -> usize {
        self.pushed_to_server.len()
            + self.pulled_from_server.len()
            + self.deleted_from_local.len()
            + self.conflicted.len()
            + self.newly_cached.len()
    }
}
