//! Typed collections over whole-file JSON arrays.
//!
//! The store has no per-record primitive: every mutation reads the full array,
//! edits it in memory and writes the whole file back with the revision it read.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::{BlobStore, StoreError};
use crate::models::{CatalogItem, Credential, UserFile};

pub const USERS_PATH: &str = "user.json";
pub const SCRAPERS_PATH: &str = "database.json";
pub const BOTS_PATH: &str = "database2.json";

/// Bounded retry for writes rejected because the revision moved.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 150,
        }
    }
}

/// One catalog collection stored as a JSON array at a fixed path.
pub struct RemoteCollection<T> {
    store: Arc<dyn BlobStore>,
    path: &'static str,
    commit_message: &'static str,
    retry: RetryPolicy,
    _item: PhantomData<fn() -> T>,
}

impl<T: CatalogItem> RemoteCollection<T> {
    pub fn new(
        store: Arc<dyn BlobStore>,
        path: &'static str,
        commit_message: &'static str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            path,
            commit_message,
            retry,
            _item: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Read the array and the revision it was read at. A missing file is an
    /// empty collection without revision.
    async fn read(&self) -> Result<(Vec<T>, Option<String>), StoreError> {
        match self.store.get_file(self.path).await {
            Ok(file) => {
                let items = serde_json::from_slice(&file.decode()?)?;
                Ok((items, Some(file.revision)))
            }
            Err(StoreError::NotFound(_)) => Ok((Vec::new(), None)),
            Err(e) => Err(e),
        }
    }

    async fn current_revision(&self) -> Result<Option<String>, StoreError> {
        match self.store.get_file(self.path).await {
            Ok(file) => Ok(Some(file.revision)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, items: &[T], revision: Option<&str>) -> Result<String, StoreError> {
        let body = serde_json::to_vec_pretty(items)?;
        self.store
            .put_file(self.path, &body, self.commit_message, revision)
            .await
    }

    /// Decide whether a failed write is retried, sleeping before the next attempt.
    async fn should_retry(&self, err: &StoreError, attempt: usize) -> bool {
        if !err.is_conflict() || attempt >= self.retry.max_attempts {
            return false;
        }
        tracing::warn!(
            path = self.path,
            attempt,
            "Revision conflict, re-reading before retry"
        );
        let backoff = self.retry.base_backoff_ms.saturating_mul(attempt as u64);
        tokio::time::sleep(Duration::from_millis(backoff)).await;
        true
    }

    /// Read-modify-write with re-apply on conflict. `edit` returns `false`
    /// to abandon the mutation without writing.
    async fn mutate<F>(&self, mut edit: F) -> Result<bool, StoreError>
    where
        F: FnMut(&mut Vec<T>) -> bool + Send,
    {
        let mut attempt = 1;
        loop {
            let (mut items, revision) = self.read().await?;
            if !edit(&mut items) {
                return Ok(false);
            }
            match self.write(&items, revision.as_deref()).await {
                Ok(_) => return Ok(true),
                Err(e) => {
                    if !self.should_retry(&e, attempt).await {
                        return Err(e);
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn report(&self, action: &str, result: Result<bool, StoreError>) -> bool {
        match result {
            Ok(applied) => applied,
            Err(e) => {
                tracing::error!("Error {} {} in {}: {}", action, T::LABEL, self.path, e);
                false
            }
        }
    }

    /// Fetch every entry. Failures are logged and yield an empty collection.
    pub async fn fetch_all(&self) -> Vec<T> {
        match self.read().await {
            Ok((items, _)) => items,
            Err(e) => {
                tracing::error!("Error fetching {} entries: {}", T::LABEL, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the whole collection.
    pub async fn replace_all(&self, items: &[T]) -> bool {
        let mut attempt = 1;
        loop {
            let written = match self.current_revision().await {
                Ok(revision) => self.write(items, revision.as_deref()).await,
                Err(e) => Err(e),
            };
            match written {
                Ok(_) => return true,
                Err(e) => {
                    if !self.should_retry(&e, attempt).await {
                        tracing::error!(
                            "Error replacing {} entries in {}: {}",
                            T::LABEL,
                            self.path,
                            e
                        );
                        return false;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Append one entry to the authoritative copy.
    pub async fn insert_one(&self, item: T) -> bool {
        let result = self
            .mutate(|items| {
                items.push(item.clone());
                true
            })
            .await;
        self.report("adding", result)
    }

    /// Remove the entry with `id`. Nothing is written when no entry matches.
    pub async fn delete_one(&self, id: &str) -> bool {
        let result = self
            .mutate(|items| {
                let before = items.len();
                items.retain(|item| !item.has_id(id));
                before != items.len()
            })
            .await;
        if matches!(result, Ok(false)) {
            tracing::warn!("No {} with id {} in {}", T::LABEL, id, self.path);
        }
        self.report("deleting", result)
    }

    /// Replace the entry carrying the same id. Entries without id never match.
    pub async fn update_one(&self, item: &T) -> bool {
        let Some(id) = item.id() else {
            tracing::warn!("Refusing to update {} without id", T::LABEL);
            return false;
        };
        let result = self
            .mutate(|items| {
                let mut matched = false;
                for existing in items.iter_mut().filter(|e| e.has_id(id)) {
                    *existing = item.clone();
                    matched = true;
                }
                matched
            })
            .await;
        if matches!(result, Ok(false)) {
            tracing::warn!("No {} with id {} in {}", T::LABEL, id, self.path);
        }
        self.report("updating", result)
    }
}

/// Read-only view of the admin credentials in `user.json`.
pub struct UserDirectory {
    store: Arc<dyn BlobStore>,
    path: &'static str,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            path: USERS_PATH,
        }
    }

    async fn read(&self) -> Result<Vec<Credential>, StoreError> {
        let file = self.store.get_file(self.path).await?;
        let parsed: UserFile = serde_json::from_slice(&file.decode()?)?;
        Ok(parsed.users)
    }

    /// Fetch every credential. Failures are logged and yield an empty list.
    pub async fn fetch_all(&self) -> Vec<Credential> {
        self.read().await.unwrap_or_else(|e| {
            tracing::error!("Error fetching users: {}", e);
            Vec::new()
        })
    }
}
