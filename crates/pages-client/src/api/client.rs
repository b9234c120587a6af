use async_trait::async_trait;
use pages_shared::{
    api::{CreatePageRequest, SearchRequest, SearchResponse, UpdatePageRequest},
    Page,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use uuid::Uuid;

use super::{PageStore, Session};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Access forbidden")]
    Forbidden,
    #[error("Page not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Everything except `NotFound` is a transport failure to callers.
    /// Backend validation rejections are deliberately not told apart.
    pub fn is_transport(&self) -> bool {
        !self.is_not_found()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Search knobs sent alongside every query
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub include_public: bool,
    pub limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_public: true,
            limit: 20,
        }
    }
}

/// [`PageStore`] backed by the pages REST API.
pub struct HttpPageStore {
    client: Client,
    base_url: String,
    session: Option<Session>,
    search: SearchOptions,
}

impl HttpPageStore {
    pub fn new(base_url: &str, session: Option<Session>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            search: SearchOptions::default(),
        }
    }

    pub fn with_search_options(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Check if a session is attached
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ============ Authenticated Request Helpers ============

    /// Attach the bearer token if we have one
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => builder.header("Authorization", session.bearer()),
            None => builder,
        }
    }

    async fn authed_get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.authed(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn authed_post<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        self.authed(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn authed_post_empty(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.authed(self.client.post(self.url(path)))
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn authed_put<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        self.authed(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)
    }

    async fn authed_delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        self.authed(self.client.delete(self.url(path)))
            .send()
            .await
            .map_err(ApiError::Network)
    }

    /// Map a non-success status to the matching error
    async fn error_for_status(response: reqwest::Response) -> ApiError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                ApiError::Validation(text)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                ApiError::Server(format!("{}: {}", status, text))
            }
        }
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                response.json().await.map_err(ApiError::Network)
            }
            _ => Err(Self::error_for_status(response).await),
        }
    }

    /// Handle response whose body we don't need
    async fn handle_empty_response(response: reqwest::Response) -> Result<(), ApiError> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::error_for_status(response).await),
        }
    }
}

#[async_trait]
impl PageStore for HttpPageStore {
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        let response = self.authed_get("/").await?;
        Self::handle_response(response).await
    }

    async fn get_page(&self, id: Uuid) -> Result<Page, ApiError> {
        let response = self.authed_get(&format!("/{}", id)).await?;
        Self::handle_response(response).await
    }

    async fn create_page(&self, req: CreatePageRequest) -> Result<Page, ApiError> {
        let response = self.authed_post("/", &req).await?;
        Self::handle_response(response).await
    }

    async fn update_page(&self, id: Uuid, req: UpdatePageRequest) -> Result<(), ApiError> {
        let response = self.authed_put(&format!("/{}", id), &req).await?;
        Self::handle_empty_response(response).await
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), ApiError> {
        let response = self.authed_delete(&format!("/{}", id)).await?;
        Self::handle_empty_response(response).await
    }

    async fn duplicate_page(&self, id: Uuid) -> Result<Page, ApiError> {
        let response = self.authed_post_empty(&format!("/{}/duplicate", id)).await?;
        Self::handle_response(response).await
    }

    async fn search_pages(&self, query: &str) -> Result<Vec<Page>, ApiError> {
        let req = SearchRequest {
            query: query.to_string(),
            include_public: self.search.include_public,
            limit: self.search.limit,
        };
        let response = self.authed_post("/search", &req).await?;
        let body: SearchResponse = Self::handle_response(response).await?;
        Ok(body.pages)
    }
}
