//! WordPress REST API gateway.
//!
//! Talks to `/wp/v2/posts` with `context=edit` so raw title, body and
//! excerpt come back. The base URL may be either the pretty-permalink root
//! (`https://host/wp-json/wp/v2`) or the query form
//! (`https://host/?rest_route=/wp/v2`).

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use wpsync_core::post::{Post, PostId, PostUpdate};
use wpsync_core::sync::{BoxFuture, GatewayError, GatewayResult, PostGateway};

const USER_AGENT: &str = concat!("wpsync/", env!("CARGO_PKG_VERSION"));

/// Body of `DELETE /posts/{id}`: the trashed post, or `{deleted, previous}`
/// when the trash was bypassed.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeleteResponse {
    Deleted { previous: Post },
    Trashed(Post),
}

impl From<DeleteResponse> for Post {
    fn from(response: DeleteResponse) -> Self {
        match response {
            DeleteResponse::Deleted { previous } => previous,
            DeleteResponse::Trashed(post) => post,
        }
    }
}

/// [`PostGateway`] over HTTP.
pub struct RestGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestGateway {
    /// Create a gateway for the `wp/v2` root at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// URL of `path` below the REST root.
    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self.base_url.split_once('?') {
            // ?rest_route=/wp/v2 carries the route inside the query string
            Some((site, query)) => format!("{site}?{}/{path}", query.trim_end_matches('/')),
            None => format!("{}/{path}", self.base_url),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<PostId>,
    ) -> GatewayResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            return Err(GatewayError::NotFound { id });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl PostGateway for RestGateway {
    fn list_posts<'a>(
        &'a self,
        status: &'a str,
        per_page: u32,
        page: u32,
    ) -> BoxFuture<'a, GatewayResult<Vec<Post>>> {
        Box::pin(async move {
            log::debug!("GET posts status={} per_page={} page={}", status, per_page, page);
            let request = self.client.get(self.endpoint("posts")).query(&[
                ("context", "edit".to_string()),
                ("status", status.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ]);
            self.send(request, None).await
        })
    }

    fn get_post(&self, id: PostId) -> BoxFuture<'_, GatewayResult<Post>> {
        Box::pin(async move {
            log::debug!("GET post {}", id);
            let request = self
                .client
                .get(self.endpoint(&format!("posts/{id}")))
                .query(&[("context", "edit")]);
            self.send(request, Some(id)).await
        })
    }

    fn update_post<'a>(
        &'a self,
        id: PostId,
        update: &'a PostUpdate,
    ) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            if self.token.is_none() {
                return Err(GatewayError::Unauthenticated);
            }
            log::debug!("POST post {}", id);
            let request = self
                .client
                .post(self.endpoint(&format!("posts/{id}")))
                .query(&[("context", "edit")])
                .json(update);
            self.send(request, Some(id)).await
        })
    }

    fn create_post<'a>(&'a self, draft: &'a PostUpdate) -> BoxFuture<'a, GatewayResult<Post>> {
        Box::pin(async move {
            if self.token.is_none() {
                return Err(GatewayError::Unauthenticated);
            }
            log::debug!("POST posts");
            let request = self
                .client
                .post(self.endpoint("posts"))
                .query(&[("context", "edit")])
                .json(draft);
            self.send(request, None).await
        })
    }

    fn delete_post(&self, id: PostId, force: bool) -> BoxFuture<'_, GatewayResult<Post>> {
        Box::pin(async move {
            if self.token.is_none() {
                return Err(GatewayError::Unauthenticated);
            }
            log::debug!("DELETE post {} force={}", id, force);
            let request = self
                .client
                .delete(self.endpoint(&format!("posts/{id}")))
                .query(&[("context", "edit"), ("force", if force { "true" } else { "false" })]);
            let response: DeleteResponse = self.send(request, Some(id)).await?;
            Ok(response.into())
        })
    }
}
