//! Background fetching with a small keyed cache.
//!
//! Requests run on worker threads and report back over a channel that the UI loop drains once
//! per tick. A key that is already cached or in flight is never requested twice; a stale key's
//! result still lands in the cache but is only shown if that key becomes current again.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
#[cfg(test)]
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;

use crate::api::{ApiError, Recipe, RecipeApi, RecipeResponse, SaveKind, SaveRequest};

/// Recipes per page of the unfiltered listing.
pub const PAGE_SIZE: u32 = 12;

pub fn total_pages(total: u64) -> u32 {
    let pages = total.div_ceil(u64::from(PAGE_SIZE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Identifies one listing: the filters that were active when it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub search: String,
    pub tag: Option<String>,
    pub page: u32,
}

impl QueryKey {
    pub fn new(search: &str, tag: Option<&str>, page: u32) -> Self {
        Self {
            search: search.trim().to_string(),
            tag: tag.map(str::to_string),
            page: page.max(1),
        }
    }

    /// Search wins over tag, and tag wins over pagination.
    pub fn request(&self) -> RecipeQuery {
        if !self.search.is_empty() {
            RecipeQuery::Search(self.search.clone())
        } else if let Some(tag) = &self.tag {
            RecipeQuery::ByTag(tag.clone())
        } else {
            RecipeQuery::Page {
                limit: PAGE_SIZE,
                skip: (self.page - 1).saturating_mul(PAGE_SIZE),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeQuery {
    Search(String),
    ByTag(String),
    Page { limit: u32, skip: u32 },
}

impl RecipeQuery {
    pub fn run(&self, api: &dyn RecipeApi) -> Result<RecipeResponse, ApiError> {
        match self {
            RecipeQuery::Search(query) => api.search_recipes(query),
            RecipeQuery::ByTag(tag) => api.get_recipes_by_tag(tag),
            RecipeQuery::Page { limit, skip } => api.get_recipes(*limit, *skip),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus<'a> {
    Loading,
    Ready(&'a RecipeResponse),
    Failed(&'a str),
}

/// What the UI loop needs to react to after draining the worker channel.
#[derive(Debug)]
pub enum QueryEvent {
    RecipesLoaded { key: QueryKey, ok: bool },
    TagsLoaded(Result<Vec<String>, ApiError>),
    SaveFinished {
        kind: SaveKind,
        result: Result<Recipe, ApiError>,
    },
}

enum WorkerMessage {
    Recipes {
        key: QueryKey,
        result: Result<RecipeResponse, ApiError>,
    },
    Tags(Result<Vec<String>, ApiError>),
    Saved {
        kind: SaveKind,
        result: Result<Recipe, ApiError>,
    },
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Ready(RecipeResponse),
    Failed(String),
}

pub struct QueryClient {
    api: Arc<dyn RecipeApi>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    cache: IndexMap<QueryKey, CacheEntry>,
    in_flight: HashSet<QueryKey>,
    capacity: usize,
}

impl QueryClient {
    pub fn new(api: Arc<dyn RecipeApi>, capacity: usize) -> Self {
        let (tx, rx) = unbounded();
        Self {
            api,
            tx,
            rx,
            cache: IndexMap::new(),
            in_flight: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Requests `key` unless a result is cached or a request is already running.
    /// Returns whether a request was dispatched.
    pub fn fetch(&mut self, key: &QueryKey) -> bool {
        if self.in_flight.contains(key) || self.cache.contains_key(key) {
            return false;
        }
        self.dispatch(key.clone());
        true
    }

    /// Requests `key` even if cached. A failed entry is dropped so the view falls back to
    /// loading; a successful one stays visible until the new result arrives.
    pub fn refetch(&mut self, key: &QueryKey) -> bool {
        if self.in_flight.contains(key) {
            return false;
        }
        if matches!(self.cache.get(key), Some(CacheEntry::Failed(_))) {
            self.cache.shift_remove(key);
        }
        self.dispatch(key.clone());
        true
    }

    /// Marks every cached listing stale, e.g. after a write.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus<'_> {
        match self.cache.get(key) {
            Some(CacheEntry::Ready(page)) => QueryStatus::Ready(page),
            Some(CacheEntry::Failed(message)) => QueryStatus::Failed(message),
            None => QueryStatus::Loading,
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn load_tags(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(WorkerMessage::Tags(api.get_tags()));
        });
    }

    pub fn save(&self, request: SaveRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tracing::debug!(kind = ?request.kind(), "dispatching save");
        thread::spawn(move || {
            let result = api.save(&request);
            let _ = tx.send(WorkerMessage::Saved {
                kind: request.kind(),
                result,
            });
        });
    }

    /// Absorbs every finished worker result without blocking.
    pub fn drain(&mut self) -> Vec<QueryEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            events.push(self.absorb(message));
        }
        events
    }

    #[cfg(test)]
    pub fn wait(&mut self, timeout: Duration) -> Option<QueryEvent> {
        let message = self.rx.recv_timeout(timeout).ok()?;
        Some(self.absorb(message))
    }

    fn dispatch(&mut self, key: QueryKey) {
        tracing::debug!(?key, "fetching recipes");
        self.in_flight.insert(key.clone());
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = key.request().run(api.as_ref());
            let _ = tx.send(WorkerMessage::Recipes { key, result });
        });
    }

    fn absorb(&mut self, message: WorkerMessage) -> QueryEvent {
        match message {
            WorkerMessage::Recipes { key, result } => {
                self.in_flight.remove(&key);
                let ok = result.is_ok();
                let entry = match result {
                    Ok(page) => CacheEntry::Ready(page),
                    Err(err) => {
                        tracing::warn!(?key, %err, "recipe query failed");
                        CacheEntry::Failed(err.to_string())
                    }
                };
                self.insert(key.clone(), entry);
                QueryEvent::RecipesLoaded { key, ok }
            }
            WorkerMessage::Tags(result) => QueryEvent::TagsLoaded(result),
            WorkerMessage::Saved { kind, result } => QueryEvent::SaveFinished { kind, result },
        }
    }

    fn insert(&mut self, key: QueryKey, entry: CacheEntry) {
        self.cache.shift_remove(&key);
        self.cache.insert(key, entry);
        while self.cache.len() > self.capacity {
            self.cache.shift_remove_index(0);
        }
    }
}
