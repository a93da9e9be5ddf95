use crate::engine::notify::{Notifier, UiEvent};
use crate::store::{self, StateStore, StoreError, StoreKey, UsageStats};
use std::sync::Arc;
use tracing::debug;

/// Lifetime run and deletion counters.
///
/// `record` is a plain read-modify-write; only one run is ever active, so
/// there is never a second writer.
#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn StateStore>,
    notifier: Notifier,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn StateStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn totals(&self) -> Result<UsageStats, StoreError> {
        Ok(store::load(self.store.as_ref(), StoreKey::Usage)
            .await?
            .unwrap_or_default())
    }

    /// Count one finished run that deleted `delta` items
    pub async fn record(&self, delta: u64) -> Result<UsageStats, StoreError> {
        let updated = self.totals().await?.with_run(delta);
        store::save(self.store.as_ref(), StoreKey::Usage, &updated).await?;

        debug!(
            "Usage updated: {} runs, {} deleted",
            updated.runs, updated.deleted
        );
        self.notifier.notify(UiEvent::Usage(updated));
        Ok(updated)
    }
}
