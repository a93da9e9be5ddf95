//! OAuth authorization-code flow and authenticated requests.
//!
//! A fresh credential is obtained on every run: the user approves the scope
//! grant out-of-band through an [`Authorizer`], the returned code is exchanged
//! for a bearer token, and the token lives only as long as the run.

use crate::env;
use crate::reddit::types::{Credential, RedditConfig, RedditError, TokenResponse};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Out-of-band user approval of the authorize URL.
///
/// Returns the full redirect URL the platform sent the user to. Implementations
/// may wait indefinitely; the platform's own flow expiry bounds the handshake.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, authorize_url: &Url) -> Result<String, RedditError>;
}

/// Source of credentials for a run
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<Credential, RedditError>;
}

pub struct AuthSession {
    config: RedditConfig,
    http: Client,
    authorizer: Arc<dyn Authorizer>,
}

impl AuthSession {
    pub fn new(config: RedditConfig, authorizer: Arc<dyn Authorizer>) -> Result<Self, RedditError> {
        if config.client_id.is_empty() {
            return Err(RedditError::InvalidConfig(
                "client_id is not set".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| RedditError::InvalidConfig(format!("user_agent: {}", e)))?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            config,
            http,
            authorizer,
        })
    }

    pub fn config(&self) -> &RedditConfig {
        &self.config
    }

    /// Resolve `path` under one of the configured base URLs, keeping any
    /// path prefix the base carries
    pub fn endpoint(&self, base: &str, path: &str) -> Result<Url, RedditError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let prefix = format!("{}/", base.path());
            base.set_path(&prefix);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    pub fn authorize_url(&self, state: &str) -> Result<Url, RedditError> {
        let mut url = self.endpoint(&self.config.auth_base_url, env::reddit::AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("duration", "temporary")
            .append_pair("scope", &self.config.scopes);
        Ok(url)
    }

    /// Extract the authorization code from the redirect the user landed on
    pub fn parse_redirect(redirect: &str, expected_state: &str) -> Result<String, RedditError> {
        let url = Url::parse(redirect.trim())
            .map_err(|e| RedditError::AuthDeclined(format!("unreadable redirect URL: {}", e)))?;

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => return Err(RedditError::AuthDeclined(value.into_owned())),
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        if state.as_deref() != Some(expected_state) {
            return Err(RedditError::AuthDeclined("state mismatch".to_string()));
        }

        code.filter(|c| !c.is_empty())
            .ok_or_else(|| RedditError::AuthDeclined("no authorization code".to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Credential, RedditError> {
        let url = self.endpoint(&self.config.auth_base_url, env::reddit::ACCESS_TOKEN_PATH)?;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Token exchange rejected with HTTP {}", status.as_u16());
            return Err(RedditError::AuthDeclined(format!(
                "token exchange failed with HTTP {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RedditError::Decode(e.to_string()))?;

        match (token.access_token, token.error) {
            (_, Some(error)) => Err(RedditError::AuthDeclined(error)),
            (Some(access_token), None) => Ok(Credential::new(access_token)),
            (None, None) => Err(RedditError::AuthDeclined(
                "token response without access_token".to_string(),
            )),
        }
    }

    /// Issue one authenticated request and decode the JSON reply.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        credential: &Credential,
        form: Option<&[(&str, &str)]>,
    ) -> Result<serde_json::Value, RedditError> {
        let body = self.send(method, url, credential, form).await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| RedditError::Decode(e.to_string()))
    }

    /// Issue one authenticated request and return the raw 2xx body.
    ///
    /// Non-2xx statuses surface as [`RedditError::Http`]; interpreting them is
    /// the caller's business.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        credential: &Credential,
        form: Option<&[(&str, &str)]>,
    ) -> Result<String, RedditError> {
        debug!("{} {}", method, url.path());

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(credential.secret());
        if let Some(form) = form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RedditError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl Authenticator for AuthSession {
    async fn authenticate(&self) -> Result<Credential, RedditError> {
        let state = format!("{:016x}", rand::random::<u64>());
        let authorize_url = self.authorize_url(&state)?;

        info!("Waiting for the user to approve access");
        let redirect = self.authorizer.authorize(&authorize_url).await?;
        let code = Self::parse_redirect(&redirect, &state)?;

        let credential = self.exchange_code(&code).await?;
        info!("Obtained access token");
        Ok(credential)
    }
}
