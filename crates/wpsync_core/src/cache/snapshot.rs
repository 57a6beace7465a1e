//! Cached snapshot: the last fully synchronized copy of a post.
//!
//! The snapshot stores the post as the server last returned it together with
//! the baseline fingerprints of its body and editable metadata. Change
//! detection on both sides is measured against these two hashes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint;
use crate::post::{Post, PostId};

/// A post plus its baseline fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSnapshot {
    /// Post as last synchronized
    pub post: Post,

    /// Fingerprint of the body at last sync
    pub content_hash: String,

    /// Fingerprint of the editable metadata at last sync
    pub editable_meta_hash: String,
}

impl CachedSnapshot {
    /// Snapshot a post, computing both fingerprints from it.
    pub fn of(post: Post) -> Result<Self> {
        let content_hash = fingerprint::content_hash(post.body());
        let editable_meta_hash = fingerprint::metadata_hash(&post.editable_metadata())?;
        Ok(Self {
            post,
            content_hash,
            editable_meta_hash,
        })
    }

    /// Id of the snapshotted post
    pub fn id(&self) -> PostId {
        self.post.id
    }

    /// Load a snapshot from its JSON text
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the snapshot to pretty JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
