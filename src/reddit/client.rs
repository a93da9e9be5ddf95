use crate::env;
use crate::reddit::auth::AuthSession;
use crate::reddit::types::{Credential, Item, ItemKind, Listing, Me, Page, RedditError};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, warn};

/// The platform calls a deletion run is made of
#[async_trait]
pub trait Platform: Send + Sync {
    /// Canonical username of the credential's owner
    async fn whoami(&self, credential: &Credential) -> Result<String, RedditError>;

    /// Most recent not-yet-deleted items of `kind`, at most `page_size` of them
    async fn fetch_page(
        &self,
        username: &str,
        kind: ItemKind,
        credential: &Credential,
        page_size: u32,
    ) -> Result<Page, RedditError>;

    async fn delete_item(&self, item: &Item, credential: &Credential) -> Result<(), RedditError>;
}

/// [`Platform`] over the live HTTP API
pub struct RedditClient {
    session: Arc<AuthSession>,
}

impl RedditClient {
    pub fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    fn api_base(&self) -> &str {
        &self.session.config().api_base_url
    }
}

/// Listing children into items, dropping kinds the nuker does not handle
fn items_from_listing(listing: Listing) -> Page {
    listing
        .data
        .children
        .into_iter()
        .filter_map(|thing| match ItemKind::from_prefix(&thing.kind) {
            Some(kind) => Some(Item {
                kind,
                id: thing.data.id,
                fullname: thing.data.name,
            }),
            None => {
                warn!("Skipping unsupported item kind {}", thing.kind);
                None
            }
        })
        .collect()
}

#[async_trait]
impl Platform for RedditClient {
    async fn whoami(&self, credential: &Credential) -> Result<String, RedditError> {
        let url = self.session.endpoint(self.api_base(), env::reddit::ME_PATH)?;
        let value = self
            .session
            .request(Method::GET, url, credential, None)
            .await?;

        let me: Me = serde_json::from_value(value).map_err(|e| RedditError::Decode(e.to_string()))?;
        Ok(me.name)
    }

    async fn fetch_page(
        &self,
        username: &str,
        kind: ItemKind,
        credential: &Credential,
        page_size: u32,
    ) -> Result<Page, RedditError> {
        let limit = page_size.clamp(1, env::reddit::MAX_PAGE_SIZE);
        let path = format!("/user/{}/{}.json", username, kind.listing());
        let mut url = self.session.endpoint(self.api_base(), &path)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let value = self
            .session
            .request(Method::GET, url, credential, None)
            .await?;

        let listing: Listing =
            serde_json::from_value(value).map_err(|e| RedditError::Decode(e.to_string()))?;
        let page = items_from_listing(listing);
        debug!("Fetched {} {} item(s) for {}", page.len(), kind, username);
        Ok(page)
    }

    async fn delete_item(&self, item: &Item, credential: &Credential) -> Result<(), RedditError> {
        let mut url = self
            .session
            .endpoint(self.api_base(), env::reddit::DELETE_PATH)?;
        url.query_pairs_mut().append_pair("id", &item.fullname);

        // Success is the status alone; the body is not always JSON
        self.session
            .send(Method::POST, url, credential, None)
            .await?;
        Ok(())
    }
}
