//! End-to-end deletion runs against a mock Reddit server
//!
//! These tests drive the real OAuth session, HTTP client and on-disk store
//! together; only the user's browser approval is scripted.

use async_trait::async_trait;
use nuker::engine::{Notifier, UiEvent};
use nuker::reddit::{Authorizer, RedditError};
use nuker::store::{self, Cooldown, StoreKey, UsageStats};
use nuker::{
    AbortCause, AuthSession, DeletionEngine, EngineConfig, FileStore, ItemKind, RedditClient,
    RedditConfig, RunOutcome,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Approves the grant the way a browser redirect would
struct BrowserApproval;

#[async_trait]
impl Authorizer for BrowserApproval {
    async fn authorize(&self, authorize_url: &Url) -> Result<String, RedditError> {
        let state = authorize_url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        Ok(format!(
            "http://localhost:65010/authorize_callback?state={}&code=one-time-code#_",
            state
        ))
    }
}

async fn mount_handshake(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "bearer-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer bearer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "spez"})))
        .mount(server)
        .await;
}

fn comment(id: &str) -> serde_json::Value {
    json!({"kind": "t1", "data": {"id": id, "name": format!("t1_{}", id)}})
}

async fn engine_for(server: &MockServer, nuker_dir: &Path) -> (DeletionEngine, Arc<FileStore>) {
    let config = RedditConfig {
        client_id: "abc".to_string(),
        client_secret: "xyz".to_string(),
        auth_base_url: server.uri(),
        api_base_url: server.uri(),
        ..RedditConfig::default()
    };
    let session = Arc::new(AuthSession::new(config, Arc::new(BrowserApproval)).unwrap());
    let client = Arc::new(RedditClient::new(session.clone()));
    let store = Arc::new(FileStore::open(nuker_dir).await.unwrap());

    let engine = DeletionEngine::new(
        EngineConfig::default(),
        session,
        client,
        store.clone(),
        Notifier::silent(),
    );
    (engine, store)
}

#[tokio::test]
async fn test_full_run_deletes_until_listing_is_empty() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("GET"))
        .and(path("/user/spez/comments.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"children": [comment("a1"), comment("b2")]}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/spez/comments.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})),
        )
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/del"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, store) = engine_for(&server, temp_dir.path()).await;

    let report = engine
        .run(ItemKind::Comment, CancellationToken::new())
        .await;

    assert_eq!(report.outcome, RunOutcome::Done);
    assert_eq!(report.deleted, 2);

    let usage: UsageStats = store::load(store.as_ref(), StoreKey::Usage)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(usage, UsageStats { runs: 1, deleted: 2 });

    let messages: Vec<String> = engine
        .activity()
        .entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert!(messages.contains(&"deleted comment, id: a1".to_string()));
    assert!(messages.contains(&"deleted comment, id: b2".to_string()));
    assert_eq!(messages.last().unwrap(), "stopping, deleted: 2");

    assert!(
        nuker::env::record_file_path(temp_dir.path(), "usage").is_file(),
        "usage should be written to disk"
    );
}

#[tokio::test]
async fn test_throttled_delete_persists_cooldown_across_engines() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("GET"))
        .and(path("/user/spez/comments.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"children": [comment("a1"), comment("b2"), comment("c3")]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/del"))
        .and(query_param("id", "t1_a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/del"))
        .and(query_param("id", "t1_b2"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/del"))
        .and(query_param("id", "t1_c3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (engine, _store) = engine_for(&server, temp_dir.path()).await;

    let report = engine
        .run(ItemKind::Comment, CancellationToken::new())
        .await;
    assert_eq!(
        report.outcome,
        RunOutcome::Aborted(AbortCause::RateLimited { status: 429 })
    );
    assert_eq!(report.deleted, 1);
    drop(engine);

    // A new process over the same state directory is still gated
    let (engine, store) = engine_for(&server, temp_dir.path()).await;
    let cooldown: Cooldown = store::load(store.as_ref(), StoreKey::Cooldown)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cooldown.duration_secs, 30);

    let report = engine
        .run(ItemKind::Comment, CancellationToken::new())
        .await;
    match report.outcome {
        RunOutcome::CoolingDown { remaining_secs } => {
            assert!(remaining_secs > 0 && remaining_secs <= 30)
        }
        other => panic!("expected CoolingDown, got {:?}", other),
    }

    let usage = engine.usage().totals().await.unwrap();
    assert_eq!(usage, UsageStats { runs: 1, deleted: 1 });
}

#[tokio::test]
async fn test_declined_authorization_never_touches_the_api() {
    struct Decline;

    #[async_trait]
    impl Authorizer for Decline {
        async fn authorize(&self, _authorize_url: &Url) -> Result<String, RedditError> {
            Err(RedditError::AuthDeclined("user closed the window".to_string()))
        }
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/del"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = RedditConfig {
        client_id: "abc".to_string(),
        auth_base_url: server.uri(),
        api_base_url: server.uri(),
        ..RedditConfig::default()
    };
    let session = Arc::new(AuthSession::new(config, Arc::new(Decline)).unwrap());
    let client = Arc::new(RedditClient::new(session.clone()));
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(temp_dir.path()).await.unwrap());
    let (notifier, mut events) = Notifier::channel();

    let engine = DeletionEngine::new(EngineConfig::default(), session, client, store, notifier);
    let report = engine.run(ItemKind::Post, CancellationToken::new()).await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Aborted(AbortCause::AuthDeclined(_))
    ));
    assert!(engine.cooldown().get().await.unwrap().is_none());

    let mut saw_unlock = false;
    while let Ok(event) = events.try_recv() {
        if event == UiEvent::Unlock(nuker::engine::Control::All) {
            saw_unlock = true;
        }
    }
    assert!(saw_unlock, "start controls should be released");
}
