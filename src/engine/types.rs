use crate::env;
use crate::reddit::ItemKind;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

pub type RunId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Listing page size, clamped to the platform maximum
    pub page_size: u32,
    pub rate_limit_cooldown_secs: u64,
    pub identity_failure_cooldown_secs: u64,
    pub fetch_failure_cooldown_secs: u64,
    /// Unannounced pause applied after every completed run; 0 disables it
    pub courtesy_cooldown_secs: u64,
    /// Statuses treated as throttling rather than terminal failures
    pub throttle_statuses: Vec<u16>,
    /// Pause between deletes inside one page
    pub delete_pacing_ms: u64,
    pub max_log_entries: usize,
    pub cancel_cooldown: CancelCooldown,
}

impl EngineConfig {
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, env::reddit::MAX_PAGE_SIZE)
    }

    pub fn delete_pacing(&self) -> Duration {
        Duration::from_millis(self.delete_pacing_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: env::reddit::MAX_PAGE_SIZE,
            rate_limit_cooldown_secs: 30,
            identity_failure_cooldown_secs: 30,
            fetch_failure_cooldown_secs: 30,
            courtesy_cooldown_secs: 30,
            throttle_statuses: vec![401, 429],
            delete_pacing_ms: 0,
            max_log_entries: 500,
            cancel_cooldown: CancelCooldown::default(),
        }
    }
}

/// Whether a user-requested abort also starts a cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CancelCooldown {
    None,
    Always { secs: u64 },
    /// Only when the aborted run deleted something
    AfterProgress { secs: u64 },
}

impl CancelCooldown {
    /// Cooldown length for a run cancelled after deleting `deleted` items
    pub fn duration_for(&self, deleted: u64) -> Option<u64> {
        match *self {
            CancelCooldown::None => None,
            CancelCooldown::Always { secs } => Some(secs),
            CancelCooldown::AfterProgress { secs } if deleted > 0 => Some(secs),
            CancelCooldown::AfterProgress { .. } => None,
        }
        .filter(|secs| *secs > 0)
    }
}

impl Default for CancelCooldown {
    fn default() -> Self {
        CancelCooldown::AfterProgress { secs: 30 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Idle,
    Authenticating,
    ResolvingIdentity,
    Fetching,
    Deleting,
    Cooling,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortCause {
    Cancelled,
    AuthDeclined(String),
    IdentityFailed(String),
    FetchFailed(String),
    RateLimited { status: u16 },
    DeleteFailed(String),
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::Cancelled => write!(f, "cancelled by user"),
            AbortCause::AuthDeclined(reason) => write!(f, "authorization declined: {}", reason),
            AbortCause::IdentityFailed(reason) => write!(f, "could not resolve user: {}", reason),
            AbortCause::FetchFailed(reason) => write!(f, "could not fetch items: {}", reason),
            AbortCause::RateLimited { status } => write!(f, "rate limited (HTTP {})", status),
            AbortCause::DeleteFailed(reason) => write!(f, "delete failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing left to delete
    Done,
    Aborted(AbortCause),
    /// Refused because a cooldown is still running
    CoolingDown { remaining_secs: u64 },
    /// Refused because another run is in progress
    Busy,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub kind: ItemKind,
    pub outcome: RunOutcome,
    pub deleted: u64,
}

impl RunReport {
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, RunOutcome::Done)
    }

    /// Whether the run got past the cooldown and single-run gates
    pub fn started(&self) -> bool {
        matches!(self.outcome, RunOutcome::Done | RunOutcome::Aborted(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Cooldown duration must be positive")]
    InvalidCooldown,
    #[error(transparent)]
    Store(#[from] StoreError),
}
