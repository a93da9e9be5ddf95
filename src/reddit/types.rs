use crate::env;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The two kinds of history item the nuker knows how to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Comment,
    Post,
}

impl ItemKind {
    /// Path segment of the user history listing
    pub fn listing(&self) -> &'static str {
        match self {
            ItemKind::Comment => "comments",
            ItemKind::Post => "submitted",
        }
    }

    /// Thing-type prefix used in fullnames
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemKind::Comment => "t1",
            ItemKind::Post => "t3",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "t1" => Some(ItemKind::Comment),
            "t3" => Some(ItemKind::Post),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Comment => f.write_str("comment"),
            ItemKind::Post => f.write_str("post"),
        }
    }
}

/// A deletable history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub id: String,
    /// `<prefix>_<id>`, the identifier the delete endpoint expects
    pub fullname: String,
}

impl Item {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        let id = id.into();
        let fullname = format!("{}_{}", kind.prefix(), id);
        Self { kind, id, fullname }
    }
}

/// One listing page, newest first. Empty means nothing is left.
pub type Page = Vec<Item>;

/// Bearer token for a single run. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub user_agent: String,
    pub scopes: String,
    pub request_timeout_secs: u64,
}

impl RedditConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: env::reddit::DEFAULT_REDIRECT_URI.to_string(),
            auth_base_url: env::reddit::AUTH_BASE_URL.to_string(),
            api_base_url: env::reddit::API_BASE_URL.to_string(),
            user_agent: env::default_user_agent(),
            scopes: env::reddit::DEFAULT_SCOPES.to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RedditError {
    #[error("Authorization declined: {0}")]
    AuthDeclined(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RedditError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RedditError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the platform answered with one of the throttling statuses
    pub fn is_rate_limited(&self, throttle_statuses: &[u16]) -> bool {
        self.status()
            .is_some_and(|status| throttle_statuses.contains(&status))
    }
}

impl From<reqwest::Error> for RedditError {
    fn from(error: reqwest::Error) -> Self {
        RedditError::Network(error.to_string())
    }
}

impl From<url::ParseError> for RedditError {
    fn from(error: url::ParseError) -> Self {
        RedditError::InvalidConfig(error.to_string())
    }
}

// Wire format of the endpoints the nuker depends on.

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub kind: String,
    pub data: ThingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThingData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Me {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
}
