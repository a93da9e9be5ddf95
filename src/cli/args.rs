//! Command line argument parsing
//!
//! Subcommands:
//! - `comments`: delete every comment in the account's history
//! - `posts`: delete every post in the account's history
//! - `status`: show the running cooldown and lifetime usage
//! - `log`: print (or clear) the activity log
//! - `show-config`: show configuration discovery information

use crate::reddit::ItemKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ExecutionMode {
    Delete(DeleteConfig),
    Status,
    Log { clear: bool },
    ShowConfig,
}

#[derive(Debug)]
pub struct DeleteConfig {
    pub kind: ItemKind,
    pub page_size: Option<u32>,
    /// Keep cooldown, usage and log in memory only
    pub ephemeral: bool,
}

#[derive(Debug, Parser)]
#[command(name = "nuker")]
#[command(author = "Reddit Nuker Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bulk-delete your Reddit comments and posts within the API rate limits")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path (skips discovery)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding cooldown, usage and log records
    #[arg(long = "state-dir", global = true)]
    pub state_dir: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Delete all of your comments
    Comments {
        /// Items requested per listing page (1-100)
        #[arg(long = "page-size")]
        page_size: Option<u32>,
        /// Do not persist cooldown, usage or log
        #[arg(long = "ephemeral")]
        ephemeral: bool,
    },
    /// Delete all of your posts
    Posts {
        /// Items requested per listing page (1-100)
        #[arg(long = "page-size")]
        page_size: Option<u32>,
        /// Do not persist cooldown, usage or log
        #[arg(long = "ephemeral")]
        ephemeral: bool,
    },
    /// Show cooldown and usage totals
    Status,
    /// Print the activity log
    Log {
        /// Erase the log instead of printing it
        #[arg(long = "clear")]
        clear: bool,
    },
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Comments {
                page_size,
                ephemeral,
            }) => Self::delete_mode(ItemKind::Comment, *page_size, *ephemeral),
            Some(Commands::Posts {
                page_size,
                ephemeral,
            }) => Self::delete_mode(ItemKind::Post, *page_size, *ephemeral),
            Some(Commands::Status) => Ok(ExecutionMode::Status),
            Some(Commands::Log { clear }) => Ok(ExecutionMode::Log { clear: *clear }),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Err(
                "No command specified. Use 'nuker --help' to see available commands.".to_string(),
            ),
        }
    }

    fn delete_mode(
        kind: ItemKind,
        page_size: Option<u32>,
        ephemeral: bool,
    ) -> Result<ExecutionMode, String> {
        if let Some(size) = page_size
            && !(1..=crate::env::reddit::MAX_PAGE_SIZE).contains(&size)
        {
            return Err(format!(
                "--page-size must be between 1 and {}, got {}",
                crate::env::reddit::MAX_PAGE_SIZE,
                size
            ));
        }

        Ok(ExecutionMode::Delete(DeleteConfig {
            kind,
            page_size,
            ephemeral,
        }))
    }
}
