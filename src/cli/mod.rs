//! CLI-specific functionality for the nuker
//!
//! This module contains argument parsing, configuration discovery and the
//! terminal front end that drives a deletion run.

pub mod args;
pub mod config;
pub mod console;

pub use args::{Args, Commands, DeleteConfig, ExecutionMode};
pub use config::{ConfigDiscovery, NukerConfig};
pub use console::{ConsoleAuthorizer, ConsolePresenter, render_cooldown, render_usage};
