use super::{StateStore, StoreError, StoreKey};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local store, used by tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<StoreKey, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<serde_json::Value>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: serde_json::Value) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.insert(key, value);
        Ok(())
    }
}
