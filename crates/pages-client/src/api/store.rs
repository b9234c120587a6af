use async_trait::async_trait;
use pages_shared::{
    api::{CreatePageRequest, UpdatePageRequest},
    Page,
};
use uuid::Uuid;

use super::ApiError;

/// Authoritative backend the cache delegates every read and write to.
///
/// `NotFound` is reported as [`ApiError::NotFound`]; the cache decides where
/// that becomes an absent value instead of a failure.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError>;
    async fn get_page(&self, id: Uuid) -> Result<Page, ApiError>;
    async fn create_page(&self, req: CreatePageRequest) -> Result<Page, ApiError>;
    async fn update_page(&self, id: Uuid, req: UpdatePageRequest) -> Result<(), ApiError>;
    async fn delete_page(&self, id: Uuid) -> Result<(), ApiError>;
    async fn duplicate_page(&self, id: Uuid) -> Result<Page, ApiError>;
    async fn search_pages(&self, query: &str) -> Result<Vec<Page>, ApiError>;
}
