//! Shared fixtures for session integration tests
//!
//! - Token minting
//! - A session wired to recording collaborators
//! - A mock marketplace API

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use servica_session::{
    MemorySessionStore, RecordingNavigator, RecordingNotifier, Session, SessionConfig,
    SessionStore,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Mint an HS256 token for `sub` expiring `ttl` seconds from now
pub fn mint_token(sub: &str, ttl: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": sub, "exp": Utc::now().timestamp() + ttl }),
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("Failed to encode JWT")
}

/// Session backed by an in-memory store and recording collaborators
#[allow(dead_code)]
pub struct TestSession {
    pub session: Session,
    pub store: Arc<dyn SessionStore>,
    pub notifier: RecordingNotifier,
    pub navigator: RecordingNavigator,
}

impl TestSession {
    pub fn new(api_base_url: &str) -> Self {
        Self::with_store(api_base_url, Arc::new(MemorySessionStore::new()))
    }

    pub fn with_store(api_base_url: &str, store: Arc<dyn SessionStore>) -> Self {
        let config = SessionConfig {
            api_base_url: api_base_url.to_string(),
            ..SessionConfig::default()
        };
        let notifier = RecordingNotifier::new();
        let navigator = RecordingNavigator::new();
        let session = Session::new(
            config,
            store.clone(),
            Arc::new(notifier.clone()),
            Arc::new(navigator.clone()),
        );
        Self {
            session,
            store,
            notifier,
            navigator,
        }
    }
}

/// Mount a successful login answer on the mock API
#[allow(dead_code)]
pub async fn mount_login(server: &MockServer, token: &str, role: &str, user_id: i64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "userRole": role,
            "userId": user_id,
        })))
        .mount(server)
        .await;
}

/// Mount a login answer carrying only `{token, userRole}`
#[allow(dead_code)]
pub async fn mount_login_without_user_id(server: &MockServer, token: &str, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "userRole": role,
        })))
        .mount(server)
        .await;
}
