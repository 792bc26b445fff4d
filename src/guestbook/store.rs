use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A list of encoded comments, newest first, shaped after a Redis list.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Prepend an entry (`LPUSH`).
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unavailable.
    async fn push_front(&self, entry: String) -> Result<(), StoreError>;

    /// Entries `start..=stop` counted from the newest (`LRANGE`). Indexes
    /// past the end are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is unavailable.
    async fn range(&self, start: usize, stop: usize) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryListStore {
    entries: RwLock<VecDeque<String>>,
}

impl MemoryListStore {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push_front(&self, entry: String) -> Result<(), StoreError> {
        self.entries.write().await.push_front(entry);
        Ok(())
    }

    async fn range(&self, start: usize, stop: usize) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .skip(start)
            .take(stop.saturating_sub(start).saturating_add(1))
            .cloned()
            .collect())
    }
}
