//! Boundary to the remote backend.
//!
//! The engine never talks HTTP itself. It sees the remote replica through
//! [`PostGateway`], which the binary implements over the WordPress REST API and
//! tests implement in memory.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::post::{Post, PostId, PostUpdate};

/// Boxed future returned by gateway methods, so the trait stays object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure reported by a [`PostGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend has no post with this id
    #[error("post {id} not found")]
    NotFound {
        /// Requested id
        id: PostId,
    },

    /// The backend answered with a non-success status
    #[error("API returned {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// A write was attempted without credentials
    #[error("not authenticated")]
    Unauthenticated,
}

impl GatewayError {
    /// True for [`GatewayError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Remote replica of the posts.
pub trait PostGateway: Send + Sync {
    /// One page of posts with the given status, newest first.
    fn list_posts<'a>(
        &'a self,
        status: &'a str,
        per_page: u32,
        page: u32,
    ) -> BoxFuture<'a, GatewayResult<Vec<Post>>>;

    /// Fetch one post; [`GatewayError::NotFound`] if it no longer exists.
    fn get_post(&self, id: PostId) -> BoxFuture<'_, GatewayResult<Post>>;

    /// Apply a partial update and return the post as the server now has it.
    fn update_post<'a>(
        &'a self,
        id: PostId,
        update: &'a PostUpdate,
    ) -> BoxFuture<'a, GatewayResult<Post>>;

    /// Create a post and return it as the server stored it, with its new id.
    fn create_post<'a>(&'a self, draft: &'a PostUpdate) -> BoxFuture<'a, GatewayResult<Post>>;

    /// Delete a post, or move it to the trash unless `force` is set.
    ///
    /// Returns the server's last copy of the post.
    fn delete_post(&self, id: PostId, force: bool) -> BoxFuture<'_, GatewayResult<Post>>;
}

impl<G: PostGateway + ?Sized> PostGateway for &G {
    fn list_posts<'a>(
        &'a self,
        status: &'a str,
        per_page: u32,
        page: u32,
    ) -> BoxFuture<'a, GatewayResult<Vec<Post>>> {
        (**self).list_posts(status, per_page, page)
    }

    fn get_post(&self, id: PostId) -> BoxFuture<'_, GatewayResult<Post>> {
        (**self).get_post(id)
    }

    fn update_post<'a>(
        &'a self,
        id: PostId,
        update: &'a PostUpdate,
    ) -> BoxFuture<'a, GatewayResult<Post>> {
        (**self).update_post(id, update)
    }

    fn create_post<'a>(&'a self, draft: &'a PostUpdate) -> BoxFuture<'a, GatewayResult<Post>> {
        (**self).create_post(draft)
    }

    fn delete_post(&self, id: PostId, force: bool) -> BoxFuture<'_, GatewayResult<Post>> {
        (**self).delete_post(id, force)
    }
}
