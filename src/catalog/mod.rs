//! In-memory collection state shared by the views.
//!
//! A hook owns the last snapshot of one collection. Views re-fetch on every
//! mount; mutations go to the remote store first and touch the local snapshot
//! only when the store accepted them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::models::{new_item_id, CatalogItem};
use crate::store::RemoteCollection;

/// Items plus whether a fetch is still in flight.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
        }
    }
}

/// Snapshot plus a counter bumped by every local mutation, so a load can tell
/// whether its fetch raced a write.
struct Tracked<T> {
    snapshot: Snapshot<T>,
    generation: u64,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            snapshot: Snapshot::default(),
            generation: 0,
        }
    }
}

impl<T> Tracked<T> {
    fn mutate(&mut self) -> &mut Snapshot<T> {
        self.generation += 1;
        &mut self.snapshot
    }
}

/// Fetches a load makes before giving up on a snapshot that keeps changing.
const LOAD_ATTEMPTS: usize = 3;

pub struct CollectionHook<T> {
    gateway: RemoteCollection<T>,
    state: RwLock<Tracked<T>>,
}

impl<T: CatalogItem> CollectionHook<T> {
    pub fn new(gateway: RemoteCollection<T>) -> Self {
        Self {
            gateway,
            state: RwLock::new(Tracked::default()),
        }
    }

    pub async fn snapshot(&self) -> Snapshot<T> {
        self.state.read().await.snapshot.clone()
    }

    /// Fetch the collection and replace the local snapshot. A fetch that
    /// overlapped a local mutation may predate it, so its result is dropped
    /// and the fetch repeated.
    pub async fn load(&self) {
        for _ in 0..LOAD_ATTEMPTS {
            let started = {
                let mut state = self.state.write().await;
                state.snapshot.loading = true;
                state.generation
            };
            let items = self.gateway.fetch_all().await;

            let mut state = self.state.write().await;
            if state.generation != started {
                tracing::debug!(
                    path = self.gateway.path(),
                    "Snapshot changed during load, fetching again"
                );
                continue;
            }
            tracing::debug!(
                path = self.gateway.path(),
                count = items.len(),
                "Loaded {} entries",
                T::LABEL
            );
            state.snapshot.items = items;
            state.snapshot.loading = false;
            return;
        }

        tracing::warn!(
            path = self.gateway.path(),
            "Keeping local {} entries after repeated concurrent changes",
            T::LABEL
        );
        self.state.write().await.snapshot.loading = false;
    }

    /// Start a load and wait at most `wait` for it. The load keeps running in
    /// the background when the wait elapses; the snapshot then still reports
    /// `loading`.
    pub async fn load_within(self: &Arc<Self>, wait: Duration) -> Snapshot<T> {
        let hook = Arc::clone(self);
        let task = tokio::spawn(async move { hook.load().await });
        if tokio::time::timeout(wait, task).await.is_err() {
            tracing::debug!(path = self.gateway.path(), "Load still pending");
        }
        self.snapshot().await
    }

    /// Store `item` under a fresh id. On success the local snapshot gains the
    /// new entry without a re-fetch, and the stored entry is returned.
    pub async fn add(&self, mut item: T) -> Option<T> {
        item.set_id(new_item_id());
        if !self.gateway.insert_one(item.clone()).await {
            return None;
        }
        let mut state = self.state.write().await;
        let snapshot = state.mutate();
        // A load that finished after the write may already hold the entry
        if !snapshot.items.iter().any(|i| i.id() == item.id()) {
            snapshot.items.push(item.clone());
        }
        Some(item)
    }

    /// Overwrite the whole collection with `items`.
    pub async fn replace(&self, items: Vec<T>) -> bool {
        if !self.gateway.replace_all(&items).await {
            return false;
        }
        let mut state = self.state.write().await;
        let snapshot = state.mutate();
        snapshot.items = items;
        snapshot.loading = false;
        true
    }

    pub async fn remove(&self, id: &str) -> bool {
        if !self.gateway.delete_one(id).await {
            return false;
        }
        self.state
            .write()
            .await
            .mutate()
            .items
            .retain(|i| !i.has_id(id));
        true
    }

    /// Overwrite the entry with the same id, keeping the id.
    pub async fn edit(&self, item: T) -> bool {
        if !self.gateway.update_one(&item).await {
            return false;
        }
        if let Some(id) = item.id() {
            let mut state = self.state.write().await;
            for existing in state.mutate().items.iter_mut().filter(|e| e.has_id(id)) {
                *existing = item.clone();
            }
        }
        true
    }
}
