use crate::engine::notify::{Notifier, UiEvent};
use crate::store::{self, LogEntry, StateStore, StoreError, StoreKey};
use std::sync::Arc;
use tracing::{info, warn};

/// Persisted, timestamped activity log shown to the user.
///
/// Appends never fail the caller: a store error is reported through
/// `tracing` and the entry is still printed.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn StateStore>,
    notifier: Notifier,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn StateStore>, notifier: Notifier, max_entries: usize) -> Self {
        Self {
            store,
            notifier,
            max_entries: max_entries.max(1),
        }
    }

    pub async fn append(&self, message: impl Into<String>) {
        let entry = LogEntry::now(message);
        info!(target: "nuker::activity", "{}", entry.message);
        self.persist(entry).await;
    }

    pub async fn append_warning(&self, message: impl Into<String>) {
        let entry = LogEntry::now(message);
        warn!(target: "nuker::activity", "{}", entry.message);
        self.persist(entry).await;
    }

    pub async fn entries(&self) -> Result<Vec<LogEntry>, StoreError> {
        Ok(store::load(self.store.as_ref(), StoreKey::Log)
            .await?
            .unwrap_or_default())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), StoreKey::Log, &Vec::<LogEntry>::new()).await
    }

    async fn persist(&self, entry: LogEntry) {
        let result = async {
            let mut entries = self.entries().await?;
            entries.push(entry.clone());
            if entries.len() > self.max_entries {
                let excess = entries.len() - self.max_entries;
                entries = entries.split_off(excess);
            }
            store::save(self.store.as_ref(), StoreKey::Log, &entries).await
        }
        .await;

        if let Err(e) = result {
            warn!("Failed to persist activity log entry: {}", e);
        }
        self.notifier.notify(UiEvent::Print(entry));
    }
}
