use serde::{Deserialize, Serialize};

use crate::models::Page;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub include_public: bool,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub pages: Vec<Page>,
    pub total: i64,
    pub query: String,
}
