#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pages_client::{ApiError, PageStore};
use pages_shared::{
    api::{CreatePageRequest, UpdatePageRequest},
    Page,
};
use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
    Duplicate,
    Search,
}

// --- Manual Mock: PageStore ---
// an in-memory stand-in for the backend. pages live in a Vec so list order
// is insertion order, like the real API. every call is counted and any
// operation can be told to fail until `heal` is called.
#[derive(Clone, Default)]
pub struct MockPageStore {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    pages: Vec<Page>,
    ticks: i64,
    failing: HashSet<Op>,
    calls: HashMap<Op, usize>,
    last_update: Option<UpdatePageRequest>,
    update_gate: Option<Arc<Notify>>,
}

impl MockState {
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(self.ticks)
    }

    fn enter(&mut self, op: Op) -> Result<(), ApiError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(ApiError::Server(format!("500: injected {:?} failure", op)));
        }
        Ok(())
    }
}

impl MockPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a page straight into the backend, bypassing the cache
    pub fn seed(&self, page: Page) {
        self.state.lock().unwrap().pages.push(page);
    }

    pub fn remove_behind_cache(&self, id: Uuid) {
        self.state.lock().unwrap().pages.retain(|p| p.id != id);
    }

    pub fn pages(&self) -> Vec<Page> {
        self.state.lock().unwrap().pages.clone()
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn last_update(&self) -> Option<UpdatePageRequest> {
        self.state.lock().unwrap().last_update.clone()
    }

    /// Hold every update until the returned handle is notified
    pub fn pause_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().update_gate = Some(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl PageStore for MockPageStore {
    async fn list_pages(&self) -> Result<Vec<Page>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::List)?;
        Ok(state.pages.clone())
    }

    async fn get_page(&self, id: Uuid) -> Result<Page, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::Get)?;
        state
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_page(&self, req: CreatePageRequest) -> Result<Page, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::Create)?;
        let page = Page {
            id: Uuid::new_v4(),
            title: req.title,
            content: req.content,
            icon: req.icon,
            parent_id: req.parent_id,
            is_public: req.is_public,
            created_at: state.now(),
            updated_at: None,
        };
        state.pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(&self, id: Uuid, req: UpdatePageRequest) -> Result<(), ApiError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.enter(Op::Update)?;
            state.update_gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        let now = state.now();
        state.last_update = Some(req.clone());
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::NotFound)?;

        if let Some(title) = req.title {
            page.title = title;
        }
        if let Some(content) = req.content {
            page.content = content;
        }
        if let Some(icon) = req.icon {
            page.icon = Some(icon);
        }
        if let Some(parent_id) = req.parent_id {
            page.parent_id = parent_id;
        }
        if let Some(is_public) = req.is_public {
            page.is_public = is_public;
        }
        page.updated_at = Some(now);
        Ok(())
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::Delete)?;
        let before = state.pages.len();
        state.pages.retain(|p| p.id != id);
        if state.pages.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn duplicate_page(&self, id: Uuid) -> Result<Page, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::Duplicate)?;
        let source = state
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        let copy = Page {
            id: Uuid::new_v4(),
            title: format!("{} (Copy)", source.title),
            is_public: false,
            created_at: state.now(),
            updated_at: None,
            ..source
        };
        state.pages.push(copy.clone());
        Ok(copy)
    }

    async fn search_pages(&self, query: &str) -> Result<Vec<Page>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.enter(Op::Search)?;
        let needle = query.to_lowercase();
        Ok(state
            .pages
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

pub fn page(title: &str) -> Page {
    Page {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: String::new(),
        icon: None,
        parent_id: None,
        is_public: false,
        created_at: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub fn page_updated_on(title: &str, year: i32, month: u32, day: u32) -> Page {
    Page {
        updated_at: Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()),
        ..page(title)
    }
}
