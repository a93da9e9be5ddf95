//! Persisted throttle window gating new runs.

use crate::engine::notify::{Notifier, UiEvent};
use crate::engine::types::EngineError;
use crate::store::{self, Cooldown, StateStore, StoreError, StoreKey};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct CooldownController {
    store: Arc<dyn StateStore>,
    notifier: Notifier,
}

impl CooldownController {
    pub fn new(store: Arc<dyn StateStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn get(&self) -> Result<Option<Cooldown>, StoreError> {
        store::load(self.store.as_ref(), StoreKey::Cooldown).await
    }

    /// Replace the cooldown with one starting now.
    ///
    /// An announced cooldown asks the front end to lock the start controls
    /// until it runs out; an unannounced one is advisory only.
    pub async fn set(&self, duration_secs: u64, announce: bool) -> Result<Cooldown, EngineError> {
        let cooldown = Cooldown::new(Utc::now(), duration_secs).ok_or(EngineError::InvalidCooldown)?;
        store::save(self.store.as_ref(), StoreKey::Cooldown, &cooldown).await?;

        info!(
            "Cooldown set for {}s ({})",
            duration_secs,
            if announce { "announced" } else { "advisory" }
        );
        self.notifier.notify(UiEvent::Cooldown {
            cooldown,
            lock_controls: announce,
        });
        Ok(cooldown)
    }

    /// Seconds until new work may start; 0 when no cooldown is running
    pub async fn remaining(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        Ok(self
            .get()
            .await?
            .map(|cooldown| cooldown.remaining_at(now))
            .unwrap_or(0))
    }
}
