//! Test utilities for wpsync_core
//!
//! This module provides shared testing infrastructure: a mock filesystem and
//! an in-memory gateway standing in for a WordPress site.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::fs::FileSystem;
use crate::post::{Post, PostId, PostUpdate, RenderedContent};
use crate::sync::{BoxFuture, CancelFlag, GatewayError, GatewayResult, PostGateway};

/// A mock filesystem for testing.
///
/// Uses `Arc<Mutex<HashMap>>` for thread-safety and allows cloning
/// while sharing the same underlying file storage.
#[derive(Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    failing_renames: Arc<Mutex<Option<String>>>,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock filesystem (builder pattern).
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        self
    }

    /// Get the content of a file (for test assertions).
    pub fn get_content(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&PathBuf::from(path))
            .cloned()
    }

    /// Make renames onto files ending in `suffix` fail, as a full disk would.
    pub fn fail_renames_onto(&self, suffix: &str) {
        *self.failing_renames.lock().unwrap() = Some(suffix.to_string());
    }

    /// Let renames succeed again.
    pub fn heal(&self) {
        *self.failing_renames.lock().unwrap() = None;
    }

    /// All file paths, sorted (for test assertions).
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "File not found"))
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        // Mock implementation - directories are implicit
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(suffix) = self.failing_renames.lock().unwrap().as_deref()
            && to.to_string_lossy().ends_with(suffix)
        {
            return Err(io::Error::other("no space left on device"));
        }
        let mut files = self.files.lock().unwrap();
        let content = files
            .remove(from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "File not found"))?;
        files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        Ok(files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

/// Build a post with the fields the sync engine looks at.
pub fn post(id: PostId, title: &str, body: &str) -> Post {
    Post {
        id,
        slug: Some(title.to_lowercase().replace(' ', "-")),
        status: Some("publish".to_string()),
        title: Some(RenderedContent::raw(title)),
        content: Some(RenderedContent::raw(body)),
        excerpt: Some(RenderedContent::raw("")),
        featured_media: Some(0),
        comment_status: Some("open".to_string()),
        ping_status: Some("open".to_string()),
        ..Default::default()
    }
}

/// Calls made against a [`FakeGateway`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    /// `list_posts`
    List { status: String, per_page: u32 },
    /// `get_post`
    Get(PostId),
    /// `update_post`, with the payload sent
    Update(PostId, PostUpdate),
    /// `create_post`, with the payload sent
    Create(PostUpdate),
    /// `delete_post`
    Delete {
        /// Deleted id
        id: PostId,
        /// Bypass the trash
        force: bool,
    },
}

/// In-memory WordPress stand-in.
#[derive(Clone, Default)]
pub struct FakeGateway {
    posts: Arc<Mutex<BTreeMap<PostId, Post>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    fail_updates: Arc<Mutex<bool>>,
    cancel_on_call: Arc<Mutex<Option<CancelFlag>>>,
}

impl FakeGateway {
    /// Create an empty site.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a post on the "server".
    pub fn put(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    /// Remove a post from the "server".
    pub fn remove(&self, id: PostId) {
        self.posts.lock().unwrap().remove(&id);
    }

    /// Current server copy of a post.
    pub fn get(&self, id: PostId) -> Option<Post> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    /// Make every update fail with a 500.
    pub fn fail_updates(&self) {
        *self.fail_updates.lock().unwrap() = true;
    }

    /// Raise `flag` while serving the next `get_post` or `update_post`,
    /// as a Ctrl-C arriving mid-request would.
    pub fn cancel_during_next_call(&self, flag: &CancelFlag) {
        *self.cancel_on_call.lock().unwrap() = Some(flag.clone());
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn maybe_cancel(&self) {
        if let Some(flag) = self.cancel_on_call.lock().unwrap().take() {
            flag.cancel();
        }
    }
}

/// Apply the fields an update carries, as WordPress does.
fn apply_update(post: &mut Post, update: &PostUpdate) {
    if let Some(content) = &update.content {
        post.content = Some(RenderedContent::raw(content.clone()));
    }
    if let Some(title) = &update.title {
        post.title = Some(RenderedContent::raw(title.clone()));
    }
    if update.slug.is_some() {
        post.slug = update.slug.clone();
    }
    if update.status.is_some() {
        post.status = update.status.clone();
    }
    if update.date.is_some() {
        post.date = update.date;
    }
    if let Some(excerpt) = &update.excerpt {
        post.excerpt = Some(RenderedContent::raw(excerpt.clone()));
    }
    if update.featured_media.is_some() {
        post.featured_media = update.featured_media;
    }
    if update.comment_status.is_some() {
        post.comment_status = update.comment_status.clone();
    }
    if update.ping_status.is_some() {
        post.ping_status = update.ping_status.clone();
    }
    if update.categories.is_some() {
        post.categories = update.categories.clone();
    }
    if update.tags.is_some() {
        post.tags = update.tags.clone();
    }
}

impl PostGateway for FakeGateway {
    fn list_posts<'a>(
        &'a self,
        status: &'a str,
        per_page: u32,
        page: u32,
    ) -> BoxFuture<'a, GatewayResult<Vec<Post>>> {
        Box::pin(async move {
            self.record(GatewayCall::List {
                status: status.to_string(),
                per_page,
            });
            let posts = self.posts.lock().unwrap();
            // Newest (highest id) first, like WordPress' default date ordering
            Ok(posts
                .values()
                .rev()
                .filter(|p| p.status.as_deref() == Some(status))
                .skip((page.saturating_sub(1) * per_page) as usize)
                .take(per_page as usize)
                .cloned()
                .collect())
        })
    }

    fn get_post(&self, id: PostId) -> BoxFuture<'_, GatewayResult<Post>> {
        Box::pin(async move {
            self.record(GatewayCall::Get(id));
            self.maybe_cancel();
            self.get(id).ok_or(GatewayError::NotFound { id })
        })
    }

    fn update_post<'a>(
        &'a self,
        id: PostId,
        update: &'a PostUpdate,
    ) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            self.record(GatewayCall::Update(id, update.clone()));
            if *self.fail_updates.lock().unwrap() {
                return Err(GatewayError::Api {
                    status: 500,
                    body: "internal error".to_string(),
                });
            }
            let mut posts = self.posts.lock().unwrap();
            let post = posts.get_mut(&id).ok_or(GatewayError::NotFound { id })?;
            apply_update(post, update);
            self.maybe_cancel();
            Ok(post.clone())
        })
    }

    fn create_post<'a>(&'a self, draft: &'a PostUpdate) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            self.record(GatewayCall::Create(draft.clone()));
            let mut posts = self.posts.lock().unwrap();
            let id = posts.keys().next_back().map_or(1, |last| last + 1);
            let mut post = Post {
                id,
                status: Some("draft".to_string()),
                excerpt: Some(RenderedContent::raw("")),
                featured_media: Some(0),
                comment_status: Some("open".to_string()),
                ping_status: Some("open".to_string()),
                ..Default::default()
            };
            apply_update(&mut post, draft);
            if post.slug.is_none() {
                post.slug = post.raw_title().map(|t| t.to_lowercase().replace(' ', "-"));
            }
            posts.insert(id, post.clone());
            Ok(post)
        })
    }

    fn delete_post(&self, id: PostId, force: bool) -> BoxFuture<'_, GatewayResult<Post>> {
        Box::pin(async move {
            self.record(GatewayCall::Delete { id, force });
            let mut posts = self.posts.lock().unwrap();
            if force {
                return posts.remove(&id).ok_or(GatewayError::NotFound { id });
            }
            let post = posts.get_mut(&id).ok_or(GatewayError::NotFound { id })?;
            post.status = Some("trash".to_string());
            Ok(post.clone())
        })
    }
}
