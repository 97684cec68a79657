//! Auth layer composed into a tower stack in front of a fake backend

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use http::header::AUTHORIZATION;
use http::{Request, Response, StatusCode};
use servica_session::{AuthLayer, MemorySessionStore, SessionError};
use tower::{service_fn, BoxError, ServiceBuilder, ServiceExt};

use crate::common::{mint_token, TestSession};

/// Backend that only accepts `Bearer <expected>`
async fn backend(expected: String, request: Request<()>) -> Result<Response<String>, Infallible> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let status = match &presented {
        Some(value) if *value == format!("Bearer {expected}") => StatusCode::OK,
        Some(_) => StatusCode::FORBIDDEN,
        None => StatusCode::UNAUTHORIZED,
    };
    let response = Response::builder()
        .status(status)
        .body(presented.unwrap_or_default())
        .unwrap_or_default();
    Ok(response)
}

async fn call(layer: AuthLayer, expected: &str) -> Result<Response<String>, BoxError> {
    let expected = expected.to_string();
    let service = ServiceBuilder::new()
        .timeout(Duration::from_secs(5))
        .layer(layer)
        .service(service_fn(move |r| backend(expected.clone(), r)));
    service
        .oneshot(Request::get("/api/me").body(()).unwrap())
        .await
}

#[tokio::test]
async fn test_stack_authorizes_with_stored_token() {
    let token = mint_token("8", 3600);
    let store = MemorySessionStore::with_identity(&token, "CLIENT", "8");
    let t = TestSession::with_store("http://unused", Arc::new(store));

    let response = call(t.session.layer(), &token).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), &format!("Bearer {token}"));
    assert!(t.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_stack_forbidden_expires_session() {
    let store = MemorySessionStore::with_identity("stale-token", "PROVIDER", "8");
    let t = TestSession::with_store("http://unused", Arc::new(store.clone()));

    let err = call(t.session.layer(), "fresh-token").await.unwrap_err();

    let err = err
        .downcast::<SessionError>()
        .expect("Expected a session error");
    assert!(err.is_session_expired());
    assert!(store.is_empty());
    assert_eq!(t.navigator.history(), vec!["/"]);
}

#[tokio::test]
async fn test_stack_without_token_reports_expiry_once() {
    let t = TestSession::new("http://unused");

    let err = call(t.session.layer(), "any").await.unwrap_err();

    assert!(err.downcast_ref::<SessionError>().is_some());
    assert_eq!(t.notifier.messages().len(), 1);
    assert!(t.store.token().is_none());
}

#[tokio::test]
async fn test_passthrough_stack_leaves_request_alone() {
    let response = call(AuthLayer::passthrough(), "any").await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.body(), "");
}

mod common;
