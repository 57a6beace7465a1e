//! Two-replica synchronization between the local cache and the remote backend.
//!
//! # Architecture
//!
//! ```text
//! Remote backend (WordPress)
//!         ↑↓  PostGateway
//!    SyncEngine (per-id reconciliation)
//!         ↑↓  CacheStore
//!    FileSystem
//! ```
//!
//! # Key Components
//!
//! - [`PostGateway`] - The remote replica
//! - [`SyncEngine`] - Runs one pass
//! - [`ChangeSet`] / [`SyncAction`] - The decision table
//! - [`SyncReport`] - What a pass did

/// Decision table
pub mod decision;
/// Sync engine orchestrator
pub mod engine;
/// Remote backend boundary
pub mod gateway;
/// Pass outcome
pub mod report;
/// Offline local change status
pub mod status;

pub use decision::{ChangeSet, SyncAction};
pub use engine::{DEFAULT_STATUSES, SyncEngine};
pub use gateway::{BoxFuture, GatewayError, GatewayResult, PostGateway};
pub use report::{SyncOutcome, SyncReport};
pub use status::{LocalStatus, local_status};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::{CacheLock, CacheStore};
use crate::error::Result;
use crate::fs::RealFileSystem;

/// Posts fetched per status when not configured.
pub const DEFAULT_WINDOW_SIZE: u32 = 20;

/// Largest page WordPress will serve; larger windows are clamped to it.
pub const MAX_WINDOW_SIZE: u32 = 100;

/// Cooperative cancellation signal shared between a pass and whoever may stop it.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Knobs for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Posts fetched per status
    pub window_size: u32,
    /// Statuses fetched, in order; the first copy of an id wins
    pub statuses: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Synchronize the cache at `cache_path` with `gateway`.
///
/// Holds an exclusive lock on the cache root for the whole pass, so a second
/// concurrent call against the same cache fails with
/// [`WpSyncError::CacheLocked`](crate::error::WpSyncError::CacheLocked).
pub async fn synchronize<G: PostGateway>(
    gateway: G,
    cache_path: &Path,
    options: &SyncOptions,
    cancel: &CancelFlag,
) -> Result<SyncReport> {
    let _lock = CacheLock::acquire(cache_path)?;

    let cache = CacheStore::new(RealFileSystem, cache_path);
    let engine = SyncEngine::new(gateway, cache).with_statuses(options.statuses.iter().cloned());
    let report = engine.run(options.window_size, cancel).await?;

    log::info!(
        "Sync finished, {} posts touched: {} pushed, {} pulled, {} deleted, {} conflicted, {} new",
        report.total(),
        report.pushed_to_server.len(),
        report.pulled_from_server.len(),
        report.deleted_from_local.len(),
        report.conflicted.len(),
        report.newly_cached.len()
    );
    Ok(report)
}
