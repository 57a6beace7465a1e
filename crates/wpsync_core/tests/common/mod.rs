//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use wpsync_core::post::{Post, PostId, PostUpdate, RenderedContent};
use wpsync_core::sync::{BoxFuture, GatewayError, GatewayResult, PostGateway};

/// In-memory site standing in for the REST API (simulates the network)
#[derive(Clone, Default)]
pub struct MockSite {
    posts: Arc<Mutex<BTreeMap<PostId, Post>>>,
    updates: Arc<Mutex<Vec<(PostId, PostUpdate)>>>,
    fetched: Arc<Mutex<Vec<PostId>>>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    pub fn remove(&self, id: PostId) {
        self.posts.lock().unwrap().remove(&id);
    }

    pub fn get(&self, id: PostId) -> Option<Post> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    pub fn edit(&self, id: PostId, edit: impl FnOnce(&mut Post)) {
        let mut posts = self.posts.lock().unwrap();
        if let Some(post) = posts.get_mut(&id) {
            edit(post);
        }
    }

    /// Partial updates received so far
    pub fn updates(&self) -> Vec<(PostId, PostUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    /// Ids fetched individually so far
    pub fn fetched(&self) -> Vec<PostId> {
        self.fetched.lock().unwrap().clone()
    }
}

impl PostGateway for MockSite {
    fn list_posts<'a>(
        &'a self,
        status: &'a str,
        per_page: u32,
        page: u32,
    ) -> BoxFuture<'a, GatewayResult<Vec<Post>>> {
        Box::pin(async move {
            let posts = self.posts.lock().unwrap();
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
            self.fetched.lock().unwrap().push(id);
            self.get(id).ok_or(GatewayError::NotFound { id })
        })
    }

    fn update_post<'a>(
        &'a self,
        id: PostId,
        update: &'a PostUpdate,
    ) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            self.updates.lock().unwrap().push((id, update.clone()));
            let mut posts = self.posts.lock().unwrap();
            let post = posts.get_mut(&id).ok_or(GatewayError::NotFound { id })?;
            if let Some(content) = &update.content {
                post.content = Some(RenderedContent {
                    raw: Some(content.clone()),
                    rendered: Some(format!("<p>{content}</p>")),
                });
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
            if let Some(excerpt) = &update.excerpt {
                post.excerpt = Some(RenderedContent::raw(excerpt.clone()));
            }
            Ok(post.clone())
        })
    }

    fn create_post<'a>(&'a self, draft: &'a PostUpdate) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            let mut posts = self.posts.lock().unwrap();
            let id = posts.keys().next_back().map_or(1, |last| last + 1);
            let mut created = post(id, draft.title.as_deref().unwrap_or_default(), "");
            if let Some(content) = &draft.content {
                created.content = Some(RenderedContent::raw(content.clone()));
            }
            created.status = draft.status.clone().or(Some("draft".to_string()));
            posts.insert(id, created.clone());
            Ok(created)
        })
    }

    fn delete_post(&self, id: PostId, _force: bool) -> BoxFuture<'_, GatewayResult<Post>> {
        Box::pin(async move {
            self.posts
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or(GatewayError::NotFound { id })
        })
    }
}

/// A published post with the editable fields filled in
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
