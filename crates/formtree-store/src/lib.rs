//! # formtree-store
//!
//! A minimal reactive state container for a loadable, filterable list:
//! a collection of items, a tri-state load status, and a filter, with one
//! asynchronous load operation.
//!
//! Concurrency follows switch-latest semantics: each [`LoadableListStore::load`]
//! call supersedes any in-flight load, and a superseded request's eventual
//! result — success or failure — is discarded rather than applied. The
//! superseded fetch is not aborted at the transport; only its ability to
//! mutate state is revoked. Stale detection uses a request token drawn from
//! an atomic generation counter.
//!
//! The HTTP collaborator is injected behind [`ItemFetcher`] and treated as
//! opaque; the store only relies on its success/failure resolution. A fetch
//! that never resolves leaves the store in `Loading` indefinitely — there is
//! no timeout layer here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

/// The injected asynchronous fetch boundary.
///
/// Implementations wrap whatever transport the host application uses; the
/// store never inspects the error beyond logging it.
#[async_trait]
pub trait ItemFetcher<T>: Send + Sync {
    /// Fetches one page of items.
    async fn fetch_items(&self, page: u32) -> anyhow::Result<Vec<T>>;
}

/// The load status of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A load is in flight (also the initial state).
    Loading,
    /// The last issued load completed successfully.
    Loaded,
    /// The last issued load failed; items keep their last known value.
    Error,
}

/// The store's filter: a free-text query and the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Free-text query, patched via [`LoadableListStore::update_query`].
    pub query: String,
    /// The page of the most recently issued load.
    pub page: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
        }
    }
}

struct StoreState<T> {
    items: Vec<T>,
    status: LoadStatus,
    filter: Filter,
}

/// A state container holding a loadable list of items.
///
/// All reads return snapshots; the single mutation entry points are
/// [`LoadableListStore::load`] and [`LoadableListStore::update_query`].
pub struct LoadableListStore<T> {
    state: RwLock<StoreState<T>>,
    fetcher: Arc<dyn ItemFetcher<T>>,
    generation: AtomicU64,
}

impl<T: Clone + Send + Sync> LoadableListStore<T> {
    /// Creates a store with no items and `Loading` status.
    pub fn new(fetcher: Arc<dyn ItemFetcher<T>>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                items: Vec::new(),
                status: LoadStatus::Loading,
                filter: Filter::default(),
            }),
            fetcher,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the current items.
    pub fn items(&self) -> Vec<T> {
        self.state
            .read()
            .expect("store lock poisoned")
            .items
            .clone()
    }

    /// Returns the current load status.
    pub fn status(&self) -> LoadStatus {
        self.state.read().expect("store lock poisoned").status
    }

    /// Returns a snapshot of the current filter.
    pub fn filter(&self) -> Filter {
        self.state
            .read()
            .expect("store lock poisoned")
            .filter
            .clone()
    }

    /// Derived value: the number of items currently held.
    pub fn count(&self) -> usize {
        self.state.read().expect("store lock poisoned").items.len()
    }

    /// Patches the filter's query, leaving everything else untouched.
    pub fn update_query(&self, query: impl Into<String>) {
        self.state.write().expect("store lock poisoned").filter.query = query.into();
    }

    /// Loads one page of items through the injected fetcher.
    ///
    /// Transitions to `Loading` synchronously, before the fetch is awaited,
    /// so callers get an immediate loading signal. If another `load` is
    /// issued before this one resolves, this one's result is discarded
    /// (switch-latest). A transport failure is contained here: it is logged,
    /// the status becomes `Error`, and the items keep their last known
    /// value.
    pub async fn load(&self, page: u32) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().expect("store lock poisoned");
            state.status = LoadStatus::Loading;
            state.filter.page = page;
        }

        let result = self.fetcher.fetch_items(page).await;

        if self.generation.load(Ordering::SeqCst) != token {
            tracing::debug!(page, "discarding superseded load result");
            return;
        }

        let mut state = self.state.write().expect("store lock poisoned");
        match result {
            Ok(items) => {
                state.items = items;
                state.status = LoadStatus::Loaded;
            }
            Err(error) => {
                tracing::error!(%error, page, "item load failed");
                state.status = LoadStatus::Error;
            }
        }
    }
}
