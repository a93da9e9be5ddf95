//! Persistent key-value state for the nuker.
//!
//! The engine never touches files or serialization formats directly: it goes
//! through the typed [`load`]/[`save`] helpers over a [`StateStore`], which is
//! either the on-disk [`FileStore`] or the in-process [`MemoryStore`].
//! Writes are last-write-wins; there are no transactional guarantees beyond a
//! single record being replaced atomically.

pub mod file;
pub mod memory;
pub mod records;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use records::{Cooldown, LogEntry, UsageStats};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// The records the nuker persists between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Log,
    Usage,
    Cooldown,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [StoreKey::Log, StoreKey::Usage, StoreKey::Cooldown];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Log => "log",
            StoreKey::Usage => "usage",
            StoreKey::Cooldown => "cooldown",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot prepare state directory {}: {source}", path.display())]
    Setup {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error on {key} record: {source}")]
    Io {
        key: StoreKey,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed {key} record: {source}")]
    Malformed {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw key-value access; `Value::Null` and a missing key both read as absent
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Result<Option<serde_json::Value>, StoreError>;

    async fn set(&self, key: StoreKey, value: serde_json::Value) -> Result<(), StoreError>;
}

/// Load a typed record, `None` when nothing has been stored yet
pub async fn load<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: StoreKey,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Malformed { key, source }),
    }
}

/// Replace a typed record
pub async fn save<T: Serialize>(
    store: &dyn StateStore,
    key: StoreKey,
    record: &T,
) -> Result<(), StoreError> {
    let value =
        serde_json::to_value(record).map_err(|source| StoreError::Malformed { key, source })?;
    store.set(key, value).await
}

/// Remove a record by storing `null`
pub async fn clear(store: &dyn StateStore, key: StoreKey) -> Result<(), StoreError> {
    store.set(key, serde_json::Value::Null).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_and_null_read_as_absent() {
        let store = MemoryStore::new();
        let usage: Option<UsageStats> = load(&store, StoreKey::Usage).await.unwrap();
        assert!(usage.is_none());

        clear(&store, StoreKey::Usage).await.unwrap();
        let usage: Option<UsageStats> = load(&store, StoreKey::Usage).await.unwrap();
        assert!(usage.is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_is_reported_with_its_key() {
        let store = MemoryStore::new();
        store
            .set(StoreKey::Cooldown, serde_json::json!("not a cooldown"))
            .await
            .unwrap();

        let err = load::<Cooldown>(&store, StoreKey::Cooldown)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Malformed {
                key: StoreKey::Cooldown,
                ..
            }
        ));
    }

    #[test]
    fn test_key_names() {
        let names: Vec<_> = StoreKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["log", "usage", "cooldown"]);
    }
}
