pub mod activity;
pub mod cooldown;
pub mod notify;
pub mod runner;
pub mod types;
pub mod usage;


pub use activity::ActivityLog;
pub use cooldown::CooldownController;
pub use notify::{Control, Notifier, UiEvent};
pub use runner::DeletionEngine;
pub use types::*;
pub use usage::UsageLedger;
