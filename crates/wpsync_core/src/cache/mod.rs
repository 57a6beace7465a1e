//! Local cache store: the on-disk replica of the remote posts.
//!
//! Each post is kept as a triad under `{root}/posts/`:
//!
//! ```text
//! {id}-{title}_editable.yaml   editable metadata, canonical YAML
//! {id}-{title}_content.md      raw body
//! {id}-{title}_meta.json       CachedSnapshot (post + baseline hashes)
//! ```
//!
//! Saves stage all three files as hidden temporaries before anything is
//! renamed, the snapshot temporary last. The staged snapshot is the record of
//! a save in progress: it is renamed into place only after the editable and
//! content files are in place and stale artifacts of the id are gone. A save
//! interrupted anywhere after staging is finished by [`CacheStore::recover`];
//! one interrupted while staging is discarded.

/// Advisory lock on the cache root
pub mod lock;
/// Artifact naming
pub mod naming;
/// Snapshot (post + baseline fingerprints)
pub mod snapshot;

pub use lock::CacheLock;
pub use naming::{Artifact, sanitize_title};
pub use snapshot::CachedSnapshot;

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Serialize;

use crate::error::{Result, WpSyncError};
use crate::fingerprint;
use crate::fs::FileSystem;
use crate::post::{EditableMetadata, Post, PostId};

/// Paths of the artifacts currently on disk for one post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    /// `_editable.yaml`, if present
    pub editable: Option<PathBuf>,
    /// `_content.md`, if present
    pub content: Option<PathBuf>,
    /// `_meta.json`, if present
    pub snapshot: Option<PathBuf>,
}

/// File-backed store of cached posts, addressed by post id.
pub struct CacheStore<FS: FileSystem> {
    fs: FS,
    root: PathBuf,
}

impl<FS: FileSystem> CacheStore<FS> {
    /// Create a store rooted at `root`. Nothing is touched on disk until the first save.
    pub fn new(fs: FS, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Directory holding the post artifacts.
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(naming::POSTS_DIR)
    }

    /// Write a post's triad, replacing whatever was cached for its id.
    ///
    /// Returns the snapshot that was written, whose hashes are the new baseline.
    pub fn save(&self, post: &Post) -> Result<CachedSnapshot> {
        let posts_dir = self.posts_dir();
        self.fs
            .create_dir_all(&posts_dir)
            .map_err(|source| WpSyncError::FileWrite {
                path: posts_dir.clone(),
                source,
            })?;

        self.recover_post(post.id)?;

        let snapshot = CachedSnapshot::of(post.clone())?;
        let editable_yaml = fingerprint::serialize_metadata(&post.editable_metadata())?;
        let snapshot_json = snapshot.to_json()?;
        let base = naming::base_name(post);

        // Snapshot staged last: once it parses, the whole triad is staged
        for (artifact, text) in [
            (Artifact::Editable, editable_yaml.as_str()),
            (Artifact::Content, post.body()),
            (Artifact::Snapshot, snapshot_json.as_str()),
        ] {
            let (temp, _) = self.staged_paths(&base, artifact);
            self.write(&temp, text)?;
        }

        self.commit(post.id, &base)?;

        log::debug!("Cached post {} as {}", post.id, base);
        Ok(snapshot)
    }

    /// Settle saves left half-done by a crash or a failed write.
    ///
    /// A staged snapshot whose hashes match the staged (or already renamed)
    /// editable and content files is committed; any other temporaries are
    /// removed. Call with the cache lock held.
    pub fn recover(&self) -> Result<()> {
        let mut ids: Vec<PostId> = self
            .entries()?
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .filter_map(naming::temp_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            self.recover_post(id)?;
        }
        Ok(())
    }

    /// Every readable snapshot, ordered by post id.
    ///
    /// Unreadable or malformed snapshot files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<CachedSnapshot>> {
        let mut snapshots = Vec::new();
        for path in self.entries()? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(naming::SNAPSHOT_SUFFIX) {
                continue;
            }

            let json = match self.fs.read_to_string(&path) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Skipping unreadable snapshot {}: {}", name, e);
                    continue;
                }
            };
            match CachedSnapshot::from_json(&json) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => log::warn!("Skipping malformed snapshot {}: {}", name, e),
            }
        }

        snapshots.sort_by_key(CachedSnapshot::id);
        Ok(snapshots)
    }

    /// Snapshot of one post, if cached and readable.
    pub fn get(&self, id: PostId) -> Result<Option<CachedSnapshot>> {
        let Some(path) = self.find(id, Artifact::Snapshot)? else {
            return Ok(None);
        };
        let json = self.read(&path)?;
        Ok(Some(CachedSnapshot::from_json(&json)?))
    }

    /// Local body of a post; empty if the content file is missing.
    pub fn read_content(&self, id: PostId) -> Result<String> {
        match self.find(id, Artifact::Content)? {
            Some(path) => self.read(&path),
            None => Ok(String::new()),
        }
    }

    /// Local editable metadata of a post; `None` if the file is missing.
    pub fn read_editable_metadata(&self, id: PostId) -> Result<Option<EditableMetadata>> {
        let Some(path) = self.find(id, Artifact::Editable)? else {
            return Ok(None);
        };
        let text = self.read(&path)?;
        fingerprint::deserialize_metadata(&text)
            .map(Some)
            .map_err(|source| WpSyncError::MalformedEditable { path, source })
    }

    /// Remove every artifact of a post. No-op when nothing is cached.
    pub fn delete(&self, id: PostId) -> Result<()> {
        for path in self.matching(&naming::id_pattern(id))? {
            self.remove(&path)?;
        }
        Ok(())
    }

    /// Which artifacts exist for a post.
    pub fn paths_for(&self, id: PostId) -> Result<ArtifactPaths> {
        Ok(ArtifactPaths {
            editable: self.find(id, Artifact::Editable)?,
            content: self.find(id, Artifact::Content)?,
            snapshot: self.find(id, Artifact::Snapshot)?,
        })
    }

    fn recover_post(&self, id: PostId) -> Result<()> {
        let staged = self.matching(&naming::temp_pattern(id))?;
        if staged.is_empty() {
            return Ok(());
        }

        for path in &staged {
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(naming::is_temp_snapshot);
            if !is_snapshot {
                continue;
            }
            let Some(snapshot) = self
                .fs
                .read_to_string(path)
                .ok()
                .and_then(|json| CachedSnapshot::from_json(&json).ok())
            else {
                continue;
            };
            if snapshot.id() == id && self.staged_matches(&snapshot)? {
                log::info!("Completing interrupted save of post {}", id);
                return self.commit(id, &naming::base_name(&snapshot.post));
            }
        }

        log::warn!("Discarding interrupted save of post {}", id);
        for path in staged {
            self.remove(&path)?;
        }
        Ok(())
    }

    /// Rename the triad staged under `base` into place and drop everything
    /// else cached for `id`. The snapshot rename comes last.
    fn commit(&self, id: PostId, base: &str) -> Result<()> {
        let mut keep = Vec::with_capacity(3);
        for artifact in [Artifact::Editable, Artifact::Content] {
            let (temp, target) = self.staged_paths(base, artifact);
            // Already renamed by the attempt being finished
            if self.fs.exists(&temp) {
                self.rename(&temp, &target)?;
            }
            keep.push(target);
        }
        let (snapshot_temp, snapshot_target) = self.staged_paths(base, Artifact::Snapshot);
        keep.push(snapshot_target.clone());

        // Triads cached under a previous title
        for existing in self.matching(&naming::id_pattern(id))? {
            if !keep.contains(&existing) {
                self.remove(&existing)?;
            }
        }

        self.rename(&snapshot_temp, &snapshot_target)?;

        for leftover in self.matching(&naming::temp_pattern(id))? {
            self.remove(&leftover)?;
        }
        Ok(())
    }

    /// Whether the files a staged snapshot describes are on disk, staged or renamed.
    fn staged_matches(&self, snapshot: &CachedSnapshot) -> Result<bool> {
        let base = naming::base_name(&snapshot.post);
        let editable = self.staged_text(&base, Artifact::Editable)?;
        let content = self.staged_text(&base, Artifact::Content)?;
        Ok(editable
            .is_some_and(|text| fingerprint::hash(text.as_bytes()) == snapshot.editable_meta_hash)
            && content.is_some_and(|text| fingerprint::content_hash(&text) == snapshot.content_hash))
    }

    fn staged_text(&self, base: &str, artifact: Artifact) -> Result<Option<String>> {
        let (temp, target) = self.staged_paths(base, artifact);
        for path in [temp, target] {
            if self.fs.exists(&path) {
                return self.read(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// `(temporary, final)` paths of one artifact under `base`.
    fn staged_paths(&self, base: &str, artifact: Artifact) -> (PathBuf, PathBuf) {
        let posts_dir = self.posts_dir();
        let name = naming::file_name(base, artifact);
        (posts_dir.join(naming::temp_name(&name)), posts_dir.join(name))
    }

    fn find(&self, id: PostId, artifact: Artifact) -> Result<Option<PathBuf>> {
        Ok(self
            .matching(&naming::artifact_pattern(id, artifact))?
            .into_iter()
            .next())
    }

    /// Files in the posts directory whose names match `pattern`, sorted.
    fn matching(&self, pattern: &Pattern) -> Result<Vec<PathBuf>> {
        let mut matches: Vec<PathBuf> = self
            .entries()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| pattern.matches(name))
            })
            .collect();
        matches.sort();
        Ok(matches)
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        let posts_dir = self.posts_dir();
        self.fs
            .list_files(&posts_dir)
            .map_err(|source| WpSyncError::FileRead {
                path: posts_dir.clone(),
                source,
            })
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.fs
            .read_to_string(path)
            .map_err(|source| WpSyncError::FileRead {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.fs
            .write_file(path, content)
            .map_err(|source| WpSyncError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.fs
            .rename(from, to)
            .map_err(|source| WpSyncError::FileWrite {
                path: to.to_path_buf(),
                source,
            })
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.fs
            .delete_file(path)
            .map_err(|source| WpSyncError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockFileSystem, post};

    fn store() -> (MockFileSystem, CacheStore<MockFileSystem>) {
        let fs = MockFileSystem::new();
        let store = CacheStore::new(fs.clone(), "/cache");
        (fs, store)
    }

    #[test]
    fn test_save_writes_triad() {
        let (fs, store) = store();
        let snapshot = store.save(&post(42, "Hello World", "Body")).unwrap();

        assert_eq!(
            fs.paths(),
            vec![
                PathBuf::from("/cache/posts/42-Hello World_content.md"),
                PathBuf::from("/cache/posts/42-Hello World_editable.yaml"),
                PathBuf::from("/cache/posts/42-Hello World_meta.json"),
            ]
        );
        assert_eq!(
            fs.get_content("/cache/posts/42-Hello World_content.md")
                .as_deref(),
            Some("Body")
        );

        let yaml = fs
            .get_content("/cache/posts/42-Hello World_editable.yaml")
            .unwrap();
        assert_eq!(snapshot.editable_meta_hash, fingerprint::hash(yaml.as_bytes()));
        assert_eq!(snapshot.content_hash, fingerprint::content_hash("Body"));
    }

    #[test]
    fn test_save_replaces_triad_under_new_title() {
        let (fs, store) = store();
        store.save(&post(5, "Old", "one")).unwrap();

        store.save(&post(5, "New", "two")).unwrap();

        let paths = fs.paths();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.to_string_lossy().contains("5-New")));
        assert_eq!(store.read_content(5).unwrap(), "two");
    }

    #[test]
    fn test_save_cleans_leftover_temporaries() {
        let fs = MockFileSystem::new().with_file("/cache/posts/.5-Old_meta.json.tmp", "{");
        let store = CacheStore::new(fs.clone(), "/cache");
        store.save(&post(5, "Old", "one")).unwrap();
        assert!(fs.get_content("/cache/posts/.5-Old_meta.json.tmp").is_none());
        assert_eq!(fs.paths().len(), 3);
    }

    /// The snapshot on disk describes exactly the files on disk.
    fn assert_consistent(store: &CacheStore<MockFileSystem>, id: PostId) {
        let snapshot = store.get(id).unwrap().unwrap();
        let content = store.read_content(id).unwrap();
        let meta = store.read_editable_metadata(id).unwrap().unwrap();
        assert_eq!(snapshot.content_hash, fingerprint::content_hash(&content));
        assert_eq!(
            snapshot.editable_meta_hash,
            fingerprint::metadata_hash(&meta).unwrap()
        );
    }

    #[test]
    fn test_interrupted_retitle_is_finished_by_recover() {
        let (fs, store) = store();
        store.save(&post(5, "Old", "one")).unwrap();

        fs.fail_renames_onto(naming::SNAPSHOT_SUFFIX);
        assert!(store.save(&post(5, "New", "two")).is_err());
        assert!(fs.exists(Path::new("/cache/posts/.5-New_meta.json.tmp")));

        fs.heal();
        store.recover().unwrap();

        let snapshots = store.list().unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].post.raw_title(), Some("New"));
        assert_eq!(store.read_content(5).unwrap(), "two");
        assert_consistent(&store, 5);
        assert_eq!(
            fs.paths(),
            vec![
                PathBuf::from("/cache/posts/5-New_content.md"),
                PathBuf::from("/cache/posts/5-New_editable.yaml"),
                PathBuf::from("/cache/posts/5-New_meta.json"),
            ]
        );
    }

    #[test]
    fn test_interrupted_save_under_same_title_is_finished_by_recover() {
        let (fs, store) = store();
        store.save(&post(5, "Same", "one")).unwrap();

        fs.fail_renames_onto(naming::SNAPSHOT_SUFFIX);
        assert!(store.save(&post(5, "Same", "two")).is_err());

        fs.heal();
        store.recover().unwrap();

        assert_eq!(store.read_content(5).unwrap(), "two");
        assert_consistent(&store, 5);
        assert_eq!(fs.paths().len(), 3);
    }

    #[test]
    fn test_interrupted_content_rename_is_finished_by_next_save() {
        let (fs, store) = store();
        store.save(&post(5, "Same", "one")).unwrap();

        fs.fail_renames_onto(naming::CONTENT_SUFFIX);
        assert!(store.save(&post(5, "Same", "two")).is_err());
        fs.heal();

        // Editable renamed, content still staged, old snapshot in place
        assert!(fs.exists(Path::new("/cache/posts/.5-Same_content.md.tmp")));
        store.save(&post(5, "Same", "three")).unwrap();

        assert_eq!(store.read_content(5).unwrap(), "three");
        assert_consistent(&store, 5);
        assert_eq!(fs.paths().len(), 3);
    }

    #[test]
    fn test_staged_snapshot_not_matching_files_is_discarded() {
        let (fs, store) = store();
        store.save(&post(5, "Old", "one")).unwrap();
        let stray = CachedSnapshot::of(post(5, "Old", "never written"))
            .unwrap()
            .to_json()
            .unwrap();
        fs.write_file(Path::new("/cache/posts/.5-Old_meta.json.tmp"), &stray)
            .unwrap();

        store.recover().unwrap();

        assert_eq!(store.read_content(5).unwrap(), "one");
        assert_consistent(&store, 5);
        assert_eq!(fs.paths().len(), 3);
    }

    #[test]
    fn test_recover_discards_half_staged_save() {
        let (fs, store) = store();
        store.save(&post(5, "Old", "one")).unwrap();
        fs.write_file(Path::new("/cache/posts/.5-Old_content.md.tmp"), "partial")
            .unwrap();

        store.recover().unwrap();

        assert_eq!(store.read_content(5).unwrap(), "one");
        assert_consistent(&store, 5);
        assert_eq!(fs.paths().len(), 3);
    }

    #[test]
    fn test_list_on_missing_directory_is_empty() {
        let (_, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_malformed_snapshot() {
        let (fs, store) = store();
        store.save(&post(1, "One", "a")).unwrap();
        store.save(&post(9, "Nine", "b")).unwrap();
        fs.write_file(Path::new("/cache/posts/7-Seven_meta.json"), "{\"post\": {\"id\": 7")
            .unwrap();

        let ids: Vec<PostId> = store.list().unwrap().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 9]);
    }

    #[test]
    fn test_read_content_missing_is_empty() {
        let (_, store) = store();
        assert_eq!(store.read_content(3).unwrap(), "");
    }

    #[test]
    fn test_read_editable_metadata() {
        let (fs, store) = store();
        assert!(store.read_editable_metadata(4).unwrap().is_none());

        store.save(&post(4, "Four", "x")).unwrap();
        let meta = store.read_editable_metadata(4).unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Four"));

        fs.write_file(
            Path::new("/cache/posts/4-Four_editable.yaml"),
            "title: [unclosed",
        )
        .unwrap();
        assert!(matches!(
            store.read_editable_metadata(4),
            Err(WpSyncError::MalformedEditable { .. })
        ));
    }

    #[test]
    fn test_delete_only_touches_that_id() {
        let (fs, store) = store();
        store.save(&post(4, "Four", "x")).unwrap();
        store.save(&post(42, "Forty two", "y")).unwrap();

        store.delete(4).unwrap();
        store.delete(1000).unwrap();

        let paths = fs.paths();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.to_string_lossy().contains("42-")));
    }

    #[test]
    fn test_get_and_paths_for() {
        let (_, store) = store();
        assert!(store.get(8).unwrap().is_none());
        assert_eq!(store.paths_for(8).unwrap(), ArtifactPaths::default());

        let saved = store.save(&post(8, "Eight", "z")).unwrap();
        assert_eq!(store.get(8).unwrap(), Some(saved));
        let paths = store.paths_for(8).unwrap();
        assert!(paths.editable.is_some() && paths.content.is_some() && paths.snapshot.is_some());
    }
}
