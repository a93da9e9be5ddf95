//! Notifications for whatever front end is watching a run.

use crate::engine::types::RunPhase;
use crate::store::{Cooldown, LogEntry, UsageStats};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// User-facing controls the front end may enable or disable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Abort,
    /// The comments and posts start controls together
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Lock(Control),
    Unlock(Control),
    Print(LogEntry),
    Usage(UsageStats),
    Cooldown {
        cooldown: Cooldown,
        lock_controls: bool,
    },
    Phase(RunPhase),
}

/// Fire-and-forget sender; events are dropped when nobody listens
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<UiEvent>>,
}

impl Notifier {
    pub fn channel() -> (Self, UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn notify(&self, event: UiEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
