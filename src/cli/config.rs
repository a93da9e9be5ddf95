//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./nuker.toml or ./.nuker/config.toml
//! 2. User config: ~/.nuker/config.toml
//! 3. System config: /etc/nuker/config.toml
//! 4. Built-in defaults
//!
//! `NUKER_*` environment variables are applied on top of whichever source won.

use crate::{engine::EngineConfig, env, reddit::RedditConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NukerConfig {
    /// Where the `.nuker` state lives; defaults to the home directory
    pub state_dir: Option<PathBuf>,
    pub reddit: RedditConfig,
    pub engine: EngineConfig,
}

impl NukerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write configuration file {}", path.display()))
    }

    /// Overlay values from `lookup` (normally the process environment)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(client_id) = lookup(env::vars::CLIENT_ID) {
            self.reddit.client_id = client_id;
        }
        if let Some(client_secret) = lookup(env::vars::CLIENT_SECRET) {
            self.reddit.client_secret = client_secret;
        }
        if let Some(redirect_uri) = lookup(env::vars::REDIRECT_URI) {
            self.reddit.redirect_uri = redirect_uri;
        }
        if let Some(state_dir) = lookup(env::vars::STATE_DIR) {
            self.state_dir = Some(PathBuf::from(state_dir));
        }
    }

    /// The `.nuker` directory records are kept in
    pub fn nuker_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => ConfigDiscovery::get_home_dir()
                .map(|home| env::nuker_dir_path(&home))
                .unwrap_or_else(|| PathBuf::from(env::NUKER_DIR_NAME)),
        }
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.reddit.client_secret.is_empty() {
            copy.reddit.client_secret = "<redacted>".to_string();
        }
        copy
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<NukerConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return NukerConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(NukerConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::first_existing(Self::get_config_candidates())
    }

    fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
        for candidate in candidates {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// List of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory
        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        // 2. User config
        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        // 3. System config
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/nuker/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(PathBuf::from(program_data).join("nuker").join("config.toml"));
        }

        candidates
    }

    /// Get home directory path
    pub fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        if let Some(found) = Self::find_config_file() {
            println!("Active configuration: {:?}", found);
        } else {
            println!("Active configuration: Built-in defaults");
        }
    }
}
