use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DEFAULT_PAGE_ICON, DEFAULT_PAGE_TITLE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageRequest {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub is_public: bool,
}

impl CreatePageRequest {
    /// Blank "Untitled" page, optionally nested under `parent_id`
    pub fn untitled(parent_id: Option<Uuid>) -> Self {
        Self {
            title: DEFAULT_PAGE_TITLE.to_string(),
            content: String::new(),
            icon: Some(DEFAULT_PAGE_ICON.to_string()),
            parent_id,
            is_public: false,
        }
    }
}

/// Partial patch. Unset fields are left out of the body and stay untouched
/// server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// `Some(None)` moves the page to the root level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl UpdatePageRequest {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
