//! Advisory lock on a cache root.
//!
//! Two sync passes against the same cache would interleave deletes and
//! renames of the same triads. The lock is held for the lifetime of
//! [`CacheLock`] and released when it is dropped, including on early return.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Result, WpSyncError};

/// Lock file name inside the cache root.
pub const LOCK_FILE: &str = ".wpsync.lock";

/// Exclusive hold on a cache root.
#[derive(Debug)]
pub struct CacheLock {
    path: PathBuf,
    file: File,
}

impl CacheLock {
    /// Take the lock without blocking; fails with [`WpSyncError::CacheLocked`]
    /// if another process holds it.
    pub fn acquire(cache_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_root).map_err(|source| WpSyncError::FileWrite {
            path: cache_root.to_path_buf(),
            source,
        })?;

        let lock_path = cache_root.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| WpSyncError::FileWrite {
                path: lock_path.clone(),
                source,
            })?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(WpSyncError::CacheLocked(cache_root.to_path_buf()));
        }

        log::debug!("Acquired cache lock {}", lock_path.display());
        Ok(Self {
            path: lock_path,
            file: lock_file,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
