mod auth;
mod client;
mod store;

pub use auth::Session;
pub use client::{ApiError, HttpPageStore, SearchOptions};
pub use store::PageStore;
