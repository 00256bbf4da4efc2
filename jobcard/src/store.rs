//! The key-value storage abstraction the board persists into.
//!
//! Everything the board keeps lives under three keys (see [`StorageKeys`]): the job
//! collection, the shop settings and the intake draft. Each value is a JSON document and is
//! always written whole; there are no partial updates, transactions or change notifications.
//!
//! An in memory implementation is provided in [`memory`], and implementors of other backends
//! can check their behaviour with [`test_suite`].
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod memory;
pub mod testing;

/// A JSON key-value store such as a browser's local storage or a directory of files.
#[async_trait]
pub trait KeyValueStore: Clone + Send + Sync {
    /// Returns the value stored under `key`, or [`None`] if nothing has been stored yet.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
    /// Removes the value stored under `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed helpers on top of [`KeyValueStore`].
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn get_as<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_as<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.set(key, serde_json::to_value(value)?).await
    }
}

impl<T: KeyValueStore> KeyValueStoreExt for T {}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Key not supported by this store: {0:?}")]
    InvalidKey(String),
    #[error("Storage IO error")]
    Io(#[from] std::io::Error),
    #[error("Error encoding or decoding data")]
    EncodeDecodeError(#[from] serde_json::Error),
    #[error("System in bad state")]
    BadState,
}

impl StoreError {
    /// Whether the stored value was unreadable, as opposed to the store itself failing.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::EncodeDecodeError(_))
    }
}

/// The keys under which the board's three records are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub jobs: String,
    pub settings: String,
    pub draft: String,
}

impl StorageKeys {
    pub const DEFAULT_PREFIX: &'static str = "sjc";

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            jobs: format!("{prefix}.jobs"),
            settings: format!("{prefix}.settings"),
            draft: format!("{prefix}.draft"),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.jobs, &self.settings, &self.draft]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }
}
