//! The deletion run state machine.
//!
//! ```text
//! Idle ─▶ Authenticating ─▶ ResolvingIdentity ─▶ Fetching ─▶ Deleting ─┐
//!                                                   ▲                  │
//!                                                   └──── next page ◀──┘
//! any halt ─▶ Cooling (persist cooldown, no sleep) ─▶ Done | Aborted
//! ```
//!
//! Requests are strictly sequential. The engine never waits out a cooldown:
//! it persists one and returns, and a later call to [`DeletionEngine::run`]
//! resumes the work from a fresh first page.

use crate::engine::activity::ActivityLog;
use crate::engine::cooldown::CooldownController;
use crate::engine::notify::{Control, Notifier, UiEvent};
use crate::engine::types::{AbortCause, EngineConfig, RunOutcome, RunPhase, RunReport};
use crate::engine::usage::UsageLedger;
use crate::reddit::{Authenticator, Credential, ItemKind, Platform, RedditError};
use crate::store::StateStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Cooldown a halting run asks for
#[derive(Debug, Clone, Copy)]
struct CooldownRequest {
    secs: u64,
    announce: bool,
}

/// How the run loop stopped
struct Halt {
    outcome: RunOutcome,
    deleted: u64,
    cooldown: Option<CooldownRequest>,
}

impl Halt {
    fn new(outcome: RunOutcome, deleted: u64) -> Self {
        Self {
            outcome,
            deleted,
            cooldown: None,
        }
    }

    fn cooling(mut self, secs: u64, announce: bool) -> Self {
        if secs > 0 {
            self.cooldown = Some(CooldownRequest { secs, announce });
        }
        self
    }
}

pub struct DeletionEngine {
    config: EngineConfig,
    authenticator: Arc<dyn Authenticator>,
    platform: Arc<dyn Platform>,
    cooldown: CooldownController,
    usage: UsageLedger,
    activity: ActivityLog,
    notifier: Notifier,
    run_guard: Mutex<()>,
    phase: Mutex<RunPhase>,
}

impl DeletionEngine {
    pub fn new(
        config: EngineConfig,
        authenticator: Arc<dyn Authenticator>,
        platform: Arc<dyn Platform>,
        store: Arc<dyn StateStore>,
        notifier: Notifier,
    ) -> Self {
        let cooldown = CooldownController::new(store.clone(), notifier.clone());
        let usage = UsageLedger::new(store.clone(), notifier.clone());
        let activity = ActivityLog::new(store, notifier.clone(), config.max_log_entries);

        Self {
            config,
            authenticator,
            platform,
            cooldown,
            usage,
            activity,
            notifier,
            run_guard: Mutex::new(()),
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &CooldownController {
        &self.cooldown
    }

    pub fn usage(&self) -> &UsageLedger {
        &self.usage
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Phase of the current run, or the terminal phase of the last one
    pub async fn phase(&self) -> RunPhase {
        *self.phase.lock().await
    }

    pub fn is_running(&self) -> bool {
        self.run_guard.try_lock().is_err()
    }

    /// Delete every item of `kind`, page by page, until none are left, the
    /// platform throttles us, or `cancel` fires.
    ///
    /// `cancel` should be fresh for each run; it is checked before every page
    /// fetch and before every delete. Requests already in flight are not
    /// interrupted.
    pub async fn run(&self, kind: ItemKind, cancel: CancellationToken) -> RunReport {
        let run_id = Uuid::new_v4();

        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Refusing to start {} deletion: a run is already active", kind);
            return RunReport {
                run_id,
                kind,
                outcome: RunOutcome::Busy,
                deleted: 0,
            };
        };

        self.set_phase(RunPhase::Idle).await;
        match self.cooldown.remaining().await {
            Ok(remaining) if remaining > 0 => {
                self.activity
                    .append(format!(
                        "on cooldown, please try again in {} seconds",
                        remaining
                    ))
                    .await;
                return RunReport {
                    run_id,
                    kind,
                    outcome: RunOutcome::CoolingDown {
                        remaining_secs: remaining,
                    },
                    deleted: 0,
                };
            }
            Ok(_) => {}
            Err(e) => warn!("Could not read cooldown, continuing without it: {}", e),
        }

        self.notifier.notify(UiEvent::Lock(Control::All));
        self.notifier.notify(UiEvent::Unlock(Control::Abort));

        let span = info_span!("run", %run_id, %kind);
        async {
            let halt = self.drive(kind, &cancel).await;
            self.finish(run_id, kind, halt).await
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, kind: ItemKind, cancel: &CancellationToken) -> Halt {
        self.set_phase(RunPhase::Authenticating).await;
        let credential = match self.authenticator.authenticate().await {
            Ok(credential) => credential,
            Err(e) => {
                self.activity
                    .append_warning(format!("error, authorization failed: {}", e))
                    .await;
                return Halt::new(RunOutcome::Aborted(AbortCause::AuthDeclined(e.to_string())), 0);
            }
        };

        self.set_phase(RunPhase::ResolvingIdentity).await;
        let username = match self.platform.whoami(&credential).await {
            Ok(username) => username,
            Err(e) => {
                self.activity
                    .append_warning(format!("error, could not resolve user: {}", e))
                    .await;
                return Halt::new(
                    RunOutcome::Aborted(AbortCause::IdentityFailed(e.to_string())),
                    0,
                )
                .cooling(self.config.identity_failure_cooldown_secs, true);
            }
        };

        self.activity.append("starting deletion").await;
        self.delete_all(&username, kind, &credential, cancel).await
    }

    async fn delete_all(
        &self,
        username: &str,
        kind: ItemKind,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Halt {
        let mut deleted = 0u64;
        let mut removed: HashSet<String> = HashSet::new();

        loop {
            if cancel.is_cancelled() {
                return self.cancelled(deleted).await;
            }

            self.set_phase(RunPhase::Fetching).await;
            let page = match self
                .platform
                .fetch_page(username, kind, credential, self.config.page_size())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    let cause = if e.is_rate_limited(&self.config.throttle_statuses) {
                        self.activity
                            .append_warning("on cooldown, too many requests")
                            .await;
                        AbortCause::RateLimited {
                            status: e.status().unwrap_or_default(),
                        }
                    } else {
                        self.activity
                            .append_warning(format!("error, could not fetch {}s: {}", kind, e))
                            .await;
                        AbortCause::FetchFailed(e.to_string())
                    };
                    return Halt::new(RunOutcome::Aborted(cause), deleted)
                        .cooling(self.config.fetch_failure_cooldown_secs, true);
                }
            };

            // Items already deleted this run can linger in a lagging listing
            let fresh: Vec<_> = page
                .iter()
                .filter(|item| !removed.contains(&item.fullname))
                .collect();
            if fresh.is_empty() {
                if !page.is_empty() {
                    warn!(
                        "Listing returned only {} already deleted item(s)",
                        page.len()
                    );
                }
                self.activity.append("no more left to delete").await;
                return Halt::new(RunOutcome::Done, deleted)
                    .cooling(self.config.courtesy_cooldown_secs, false);
            }

            self.set_phase(RunPhase::Deleting).await;
            debug!(
                "Deleting page of {} item(s), {} already gone",
                fresh.len(),
                page.len() - fresh.len()
            );

            for (index, item) in fresh.into_iter().enumerate() {
                if index > 0 && !self.pace(cancel).await {
                    return self.cancelled(deleted).await;
                }
                if cancel.is_cancelled() {
                    return self.cancelled(deleted).await;
                }

                match self.platform.delete_item(item, credential).await {
                    Ok(()) => {
                        deleted += 1;
                        removed.insert(item.fullname.clone());
                        self.activity
                            .append(format!("deleted {}, id: {}", item.kind, item.id))
                            .await;
                    }
                    Err(e) => {
                        self.activity
                            .append_warning(format!(
                                "failed to delete {}, id: {} ({})",
                                item.kind, item.id, e
                            ))
                            .await;
                        return self.delete_failed(e, deleted).await;
                    }
                }
            }
        }
    }

    async fn delete_failed(&self, error: RedditError, deleted: u64) -> Halt {
        if error.is_rate_limited(&self.config.throttle_statuses) {
            self.activity
                .append_warning("on cooldown, too many requests")
                .await;
            return Halt::new(
                RunOutcome::Aborted(AbortCause::RateLimited {
                    status: error.status().unwrap_or_default(),
                }),
                deleted,
            )
            .cooling(self.config.rate_limit_cooldown_secs, true);
        }

        Halt::new(
            RunOutcome::Aborted(AbortCause::DeleteFailed(error.to_string())),
            deleted,
        )
    }

    async fn cancelled(&self, deleted: u64) -> Halt {
        self.activity.append_warning("aborting process").await;
        let halt = Halt::new(RunOutcome::Aborted(AbortCause::Cancelled), deleted);
        match self.config.cancel_cooldown.duration_for(deleted) {
            Some(secs) => {
                self.activity
                    .append(format!("reset cooldown to {} seconds", secs))
                    .await;
                halt.cooling(secs, true)
            }
            None => halt,
        }
    }

    /// Sleep between deletes; false when cancelled while waiting
    async fn pace(&self, cancel: &CancellationToken) -> bool {
        let pacing = self.config.delete_pacing();
        if pacing.is_zero() {
            return true;
        }
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(pacing) => true,
        }
    }

    async fn finish(&self, run_id: Uuid, kind: ItemKind, halt: Halt) -> RunReport {
        let mut controls_locked = false;
        if let Some(request) = halt.cooldown {
            self.set_phase(RunPhase::Cooling).await;
            match self.cooldown.set(request.secs, request.announce).await {
                Ok(_) => controls_locked = request.announce,
                Err(e) => warn!("Failed to persist cooldown: {}", e),
            }
        }

        if let Err(e) = self.usage.record(halt.deleted).await {
            warn!("Failed to update usage totals: {}", e);
        }

        let terminal = match halt.outcome {
            RunOutcome::Done => RunPhase::Done,
            _ => RunPhase::Aborted,
        };
        self.set_phase(terminal).await;

        self.activity
            .append(format!("stopping, deleted: {}", halt.deleted))
            .await;
        if !controls_locked {
            self.notifier.notify(UiEvent::Unlock(Control::All));
        }
        self.notifier.notify(UiEvent::Lock(Control::Abort));

        info!(
            "Run finished: {:?}, {} {}(s) deleted",
            halt.outcome, halt.deleted, kind
        );

        RunReport {
            run_id,
            kind,
            outcome: halt.outcome,
            deleted: halt.deleted,
        }
    }

    async fn set_phase(&self, phase: RunPhase) {
        let mut current = self.phase.lock().await;
        if *current != phase {
            debug!("Phase {:?} -> {:?}", *current, phase);
            *current = phase;
            self.notifier.notify(UiEvent::Phase(phase));
        }
    }
}
