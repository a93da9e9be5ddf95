pub mod auth;
pub mod client;
pub mod types;


pub use auth::{AuthSession, Authenticator, Authorizer};
pub use client::{Platform, RedditClient};
pub use types::*;
