//! Client-side page cache and change propagation for a hierarchical notes
//! workspace.
//!
//! [`PageCache`] mirrors the backend's page list, funnels every mutation
//! through the [`PageStore`] and tells observers when the snapshot changed.
//! [`PageTree`] derives the sidebar tree, breadcrumbs and recency views from
//! a snapshot.

pub mod api;
pub mod cache;
pub mod config;
pub mod notifier;
pub mod tree;

pub use api::{ApiError, HttpPageStore, PageStore, SearchOptions, Session};
pub use cache::PageCache;
pub use config::ClientConfig;
pub use notifier::{ChangeNotifier, Subscription};
pub use tree::{PageTree, TreeRow};
