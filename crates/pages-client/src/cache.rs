//! The page cache: the client's single view of which pages exist.
//!
//! The snapshot is either "never loaded" or an exact copy of the last list the
//! backend returned. It is never patched locally; every successful mutation
//! is followed by a full re-fetch, then one change notification.

use std::sync::{Arc, RwLock};

use pages_shared::{
    api::{CreatePageRequest, UpdatePageRequest},
    Page,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, PageStore};
use crate::notifier::{ChangeNotifier, Subscription};
use crate::tree::PageTree;

/// Separator placed between existing content and appended generated text
const APPEND_SEPARATOR: &str = "\n\n";

#[derive(Clone)]
struct View {
    pages: Arc<Vec<Page>>,
    /// Set while the snapshot holds search results instead of the full list
    query: Option<String>,
}

pub struct PageCache<S> {
    store: S,
    view: RwLock<Option<View>>,
    /// Serializes request -> refresh -> notify cycles
    write_gate: Mutex<()>,
    notifier: Arc<ChangeNotifier>,
}

impl<S: PageStore> PageCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            view: RwLock::new(None),
            write_gate: Mutex::new(()),
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    // ============ Observers ============

    /// Register an observer called after every snapshot replacement.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    // ============ Snapshot reads ============

    fn current(&self) -> Option<View> {
        self.view
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn install(&self, view: View) {
        *self.view.write().unwrap_or_else(|e| e.into_inner()) = Some(view);
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Current snapshot without fetching; empty before the first load.
    /// This is what observers should read from inside a callback.
    pub fn snapshot(&self) -> Arc<Vec<Page>> {
        self.current()
            .map(|view| view.pages)
            .unwrap_or_default()
    }

    /// The query the snapshot is scoped to, if the last replacement was a
    /// search.
    pub fn active_query(&self) -> Option<String> {
        self.current().and_then(|view| view.query)
    }

    /// Run `f` against a tree projection of the current snapshot.
    pub fn with_tree<R>(&self, f: impl FnOnce(&PageTree<'_>) -> R) -> R {
        let pages = self.snapshot();
        f(&PageTree::new(&pages))
    }

    /// Current snapshot, loading it first if it has never been populated.
    pub async fn list(&self) -> Result<Arc<Vec<Page>>, ApiError> {
        if let Some(view) = self.current() {
            return Ok(view.pages);
        }

        let _gate = self.write_gate.lock().await;
        // another caller may have finished the first load while we waited
        if let Some(view) = self.current() {
            return Ok(view.pages);
        }
        self.refresh_locked().await
    }

    /// Up to `limit` pages, most recently modified first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Page>, ApiError> {
        let pages = self.list().await?;
        let tree = PageTree::new(&pages);
        Ok(tree.recent(limit).into_iter().cloned().collect())
    }

    /// Fetch one page directly from the backend, bypassing the snapshot.
    /// Missing pages and transport failures both come back as `None`.
    pub async fn get(&self, id: Uuid) -> Option<Page> {
        match self.store.get_page(id).await {
            Ok(page) => Some(page),
            Err(ApiError::NotFound) => {
                tracing::debug!(page = %id, "page not found");
                None
            }
            Err(e) => {
                tracing::warn!(page = %id, error = %e, "failed to fetch page");
                None
            }
        }
    }

    // ============ Refresh ============

    /// Re-fetch the full page list, replace the snapshot and notify.
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<Vec<Page>>, ApiError> {
        let _gate = self.write_gate.lock().await;
        self.refresh_locked().await
    }

    /// Caller must hold `write_gate`.
    async fn refresh_locked(&self) -> Result<Arc<Vec<Page>>, ApiError> {
        let pages = match self.store.list_pages().await {
            Ok(pages) => Arc::new(pages),
            Err(e) => {
                tracing::warn!(error = %e, "page list refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        tracing::debug!(count = pages.len(), "page snapshot refreshed");
        self.install(View {
            pages: Arc::clone(&pages),
            query: None,
        });
        self.notifier.notify_all();

        Ok(pages)
    }

    // ============ Mutations ============

    /// Create an "Untitled" page, optionally nested under `parent_id`.
    pub async fn create(&self, parent_id: Option<Uuid>) -> Result<Page, ApiError> {
        let _gate = self.write_gate.lock().await;

        let page = self
            .store
            .create_page(CreatePageRequest::untitled(parent_id))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to create page"))?;
        tracing::info!(page = %page.id, parent = ?parent_id, "page created");

        self.refresh_locked().await?;
        Ok(page)
    }

    /// Send a partial patch; fields left unset are untouched server-side.
    pub async fn update(&self, id: Uuid, req: UpdatePageRequest) -> Result<(), ApiError> {
        let _gate = self.write_gate.lock().await;
        self.update_locked(id, req).await
    }

    async fn update_locked(&self, id: Uuid, req: UpdatePageRequest) -> Result<(), ApiError> {
        self.store
            .update_page(id, req)
            .await
            .inspect_err(|e| tracing::warn!(page = %id, error = %e, "failed to update page"))?;
        tracing::info!(page = %id, "page updated");

        self.refresh_locked().await?;
        Ok(())
    }

    /// Delete a page. A page that is already gone counts as deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let _gate = self.write_gate.lock().await;

        match self.store.delete_page(id).await {
            Ok(()) => tracing::info!(page = %id, "page deleted"),
            Err(ApiError::NotFound) => {
                tracing::debug!(page = %id, "page already deleted");
            }
            Err(e) => {
                tracing::warn!(page = %id, error = %e, "failed to delete page");
                return Err(e);
            }
        }

        self.refresh_locked().await?;
        Ok(())
    }

    /// Ask the backend for a copy of `id`. Returns `None` only when the source
    /// page no longer exists; the snapshot is still refreshed in that case.
    /// Any other rejection (403, 422, server or network errors) is returned as
    /// `Err` and leaves the snapshot untouched.
    pub async fn duplicate(&self, id: Uuid) -> Result<Option<Page>, ApiError> {
        let _gate = self.write_gate.lock().await;

        let copy = match self.store.duplicate_page(id).await {
            Ok(page) => {
                tracing::info!(source = %id, page = %page.id, "page duplicated");
                Some(page)
            }
            Err(ApiError::NotFound) => {
                tracing::debug!(source = %id, "duplicate source not found");
                None
            }
            Err(e) => {
                tracing::warn!(source = %id, error = %e, "failed to duplicate page");
                return Err(e);
            }
        };

        self.refresh_locked().await?;
        Ok(copy)
    }

    /// Replace the snapshot with the backend's matches for `query` and
    /// notify. The snapshot stays query-scoped until the next refresh. A
    /// blank query clears the search.
    pub async fn search(&self, query: &str) -> Result<Arc<Vec<Page>>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return self.refresh().await;
        }

        let _gate = self.write_gate.lock().await;

        let pages = self
            .store
            .search_pages(query)
            .await
            .inspect_err(|e| tracing::warn!(query, error = %e, "page search failed"))?;
        let pages = Arc::new(pages);
        tracing::debug!(query, count = pages.len(), "search results installed");

        self.install(View {
            pages: Arc::clone(&pages),
            query: Some(query.to_string()),
        });
        self.notifier.notify_all();

        Ok(pages)
    }

    /// Append generated text to a page's content through the normal update
    /// path. Returns `Ok(false)` if the page does not exist.
    pub async fn append_content(&self, id: Uuid, text: &str) -> Result<bool, ApiError> {
        let _gate = self.write_gate.lock().await;

        let page = match self.store.get_page(id).await {
            Ok(page) => page,
            Err(ApiError::NotFound) => return Ok(false),
            Err(e) => return Err(e),
        };

        let content = if page.content.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", page.content, APPEND_SEPARATOR, text)
        };

        self.update_locked(id, UpdatePageRequest::content(content)).await?;
        Ok(true)
    }
}
