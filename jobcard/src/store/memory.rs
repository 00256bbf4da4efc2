//! Provides an in memory implementation of [`KeyValueStore`].
//!
//! Currently this is provided for testing purposes and for embedding the board where nothing
//! needs to outlive the process.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use async_trait::async_trait;

use super::{KeyValueStore, StoreError};

/// An in memory implementation of [`KeyValueStore`].
///
/// Clones share the same underlying values.
#[derive(Clone, Default, Debug)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    unavailable: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new instance of [`InMemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`], the way a full or
    /// disabled browser storage would. Reads keep working.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// The number of successful `set` and `remove` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("storage is disabled".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self
            .values
            .read()
            .map_err(|_| StoreError::BadState)?
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.check_available()?;
        self.values
            .write()
            .map_err(|_| StoreError::BadState)?
            .insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.values
            .write()
            .map_err(|_| StoreError::BadState)?
            .remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
