//! # Nuker
//!
//! A rate-limited bulk deletion engine for a Reddit account's own comments and
//! posts. A run authorizes through OAuth, resolves the account name, then
//! repeatedly fetches the first page of the chosen listing and deletes every
//! item on it until the listing comes back empty.
//!
//! ## Architecture Overview
//!
//! - **[`reddit`]**: OAuth handshake, listing fetches and deletes over HTTP
//! - **[`engine`]**: The run state machine, cooldown gate, usage ledger and activity log
//! - **[`store`]**: Persisted records (cooldown, usage, log) behind a key-value trait
//! - **[`cli`]**: Argument parsing, configuration discovery and the terminal front end
//!
//! ## Throttling
//!
//! The engine never sleeps through a rate limit. When the platform answers
//! with a throttling status, the run stops, a cooldown is persisted, and new
//! runs are refused until it expires. Because deleted items vanish from the
//! listing, every run simply starts again from the first page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nuker::{AuthSession, DeletionEngine, EngineConfig, FileStore, ItemKind, RedditClient};
//! use nuker::cli::ConsoleAuthorizer;
//! use nuker::engine::Notifier;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = nuker::NukerConfig::default();
//!     let session = Arc::new(AuthSession::new(config.reddit.clone(), Arc::new(ConsoleAuthorizer))?);
//!     let client = Arc::new(RedditClient::new(session.clone()));
//!     let store = Arc::new(FileStore::open(config.nuker_dir()).await?);
//!
//!     let engine = DeletionEngine::new(EngineConfig::default(), session, client, store, Notifier::silent());
//!     let report = engine.run(ItemKind::Comment, CancellationToken::new()).await;
//!
//!     println!("{:?}: deleted {}", report.outcome, report.deleted);
//!     Ok(())
//! }
//! ```

/// Reddit API access.
///
/// Authorization-code OAuth, identity lookup, listing pages and deletes,
/// behind the [`reddit::Authenticator`] and [`reddit::Platform`] traits.
pub mod reddit;

/// The deletion run state machine and its supporting ledgers.
pub mod engine;

/// Persisted key-value state.
pub mod store;

/// Environment constants and path utilities.
///
/// Centralizes the paths, endpoint defaults and variable names used
/// throughout the application.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use cli::NukerConfig;
pub use engine::{
    AbortCause, CancelCooldown, DeletionEngine, EngineConfig, RunOutcome, RunPhase, RunReport,
};
pub use reddit::{AuthSession, ItemKind, RedditClient, RedditConfig, RedditError};
pub use store::{FileStore, MemoryStore, StateStore};
