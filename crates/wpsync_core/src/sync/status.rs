//! Offline view of local edits: what the next pass would consider changed
//! on the local side, without contacting the server.

use serde::Serialize;

use crate::cache::{CacheStore, CachedSnapshot};
use crate::error::Result;
use crate::fingerprint;
use crate::fs::FileSystem;
use crate::post::{EditableMetadata, PostId};

/// The local side of a post as it is on disk right now.
pub(crate) struct LocalState {
    pub(crate) content: String,
    pub(crate) metadata: Option<EditableMetadata>,
}

impl LocalState {
    pub(crate) fn read<FS: FileSystem>(cache: &CacheStore<FS>, id: PostId) -> Result<Self> {
        Ok(Self {
            content: cache.read_content(id)?,
            metadata: cache.read_editable_metadata(id)?,
        })
    }

    pub(crate) fn content_changed(&self, baseline: &CachedSnapshot) -> bool {
        fingerprint::content_hash(&self.content) != baseline.content_hash
    }

    /// A missing editable file counts as empty metadata.
    pub(crate) fn metadata_changed(&self, baseline: &CachedSnapshot) -> Result<bool> {
        let meta = self.metadata.clone().unwrap_or_default();
        Ok(fingerprint::metadata_hash(&meta)? != baseline.editable_meta_hash)
    }
}

/// Local change state of one cached post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalStatus {
    /// Post id
    pub id: PostId,
    /// Title as last synchronized
    pub title: Option<String>,
    /// Body differs from the baseline
    pub content_changed: bool,
    /// Editable metadata differs from the baseline
    pub metadata_changed: bool,
}

impl LocalStatus {
    /// Either side of the post was edited locally.
    pub fn is_modified(&self) -> bool {
        self.content_changed || self.metadata_changed
    }
}

/// Compare every cached post's local files against its baseline.
pub fn local_status<FS: FileSystem>(cache: &CacheStore<FS>) -> Result<Vec<LocalStatus>> {
    cache
        .list()?
        .into_iter()
        .map(|snapshot| {
            let local = LocalState::read(cache, snapshot.id())?;
            Ok(LocalStatus {
                id: snapshot.id(),
                title: snapshot.post.raw_title().map(String::from),
                content_changed: local.content_changed(&snapshot),
                metadata_changed: local.metadata_changed(&snapshot)?,
            })
        })
        .collect()
}
