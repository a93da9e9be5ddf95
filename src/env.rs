//! Environment constants and path utilities for the nuker.
//!
//! This module centralizes all hardcoded paths, file names and platform
//! endpoints used throughout the application, making them easier to maintain.

use std::path::{Path, PathBuf};

/// Main application directory name (hidden directory like .git, .vscode)
pub const NUKER_DIR_NAME: &str = ".nuker";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "nuker.toml";

/// Persistent store layout
pub mod store {
    /// State directory name within .nuker
    pub const STATE_DIR_NAME: &str = "state";

    /// Extension used for record files
    pub const RECORD_EXTENSION: &str = "json";

    /// Extension used for in-flight writes before they are renamed into place
    pub const TEMP_EXTENSION: &str = "json.tmp";
}

/// Platform endpoints and defaults
pub mod reddit {
    /// Host serving the OAuth authorize and token endpoints
    pub const AUTH_BASE_URL: &str = "https://www.reddit.com";

    /// Host serving authenticated API calls
    pub const API_BASE_URL: &str = "https://oauth.reddit.com";

    pub const AUTHORIZE_PATH: &str = "/api/v1/authorize";
    pub const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";
    pub const ME_PATH: &str = "/api/v1/me";
    pub const DELETE_PATH: &str = "/api/del";

    /// Largest `limit` the listing endpoints accept
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Scopes needed to read history, resolve identity and delete
    pub const DEFAULT_SCOPES: &str = "submit edit history identity";

    /// Redirect URI registered for the installed-app client
    pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:65010/authorize_callback";
}

/// Environment variable names consulted after config files are loaded
pub mod vars {
    pub const CLIENT_ID: &str = "NUKER_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "NUKER_CLIENT_SECRET";
    pub const REDIRECT_URI: &str = "NUKER_REDIRECT_URI";
    pub const STATE_DIR: &str = "NUKER_STATE_DIR";
}

/// User agent sent with every request, as the platform's API rules require
pub fn default_user_agent() -> String {
    format!(
        "rust:nuker:v{} (by /u/reddit-nuker)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Build the main .nuker directory path from a root directory
pub fn nuker_dir_path(root: &Path) -> PathBuf {
    root.join(NUKER_DIR_NAME)
}

/// Build the directory holding persisted records
pub fn state_dir_path(nuker_dir: &Path) -> PathBuf {
    nuker_dir.join(store::STATE_DIR_NAME)
}

/// Build the file path of a single persisted record
pub fn record_file_path(nuker_dir: &Path, key: &str) -> PathBuf {
    state_dir_path(nuker_dir).join(format!("{}.{}", key, store::RECORD_EXTENSION))
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    nuker_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    nuker_dir_path(current_dir).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_construction() {
        let home = Path::new("/home/user");
        let nuker_dir = nuker_dir_path(home);

        assert_eq!(nuker_dir, Path::new("/home/user/.nuker"));
        assert_eq!(
            state_dir_path(&nuker_dir),
            Path::new("/home/user/.nuker/state")
        );
        assert_eq!(
            record_file_path(&nuker_dir, "cooldown"),
            Path::new("/home/user/.nuker/state/cooldown.json")
        );
    }

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.nuker/config.toml")
        );

        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/.nuker/config.toml")
        );
    }

    #[test]
    fn test_user_agent_carries_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("rust:nuker:v"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }
}
