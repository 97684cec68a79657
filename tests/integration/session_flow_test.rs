//! End-to-end session lifecycle against a mock marketplace API
//!
//! Login, guarded navigation, authenticated calls and forced expiry.

use std::sync::Arc;

use serde_json::{json, Value};
use servica_session::{
    Credentials, FileSessionStore, LoginOutcome, Role, SessionError, SessionStore,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{mint_token, mount_login, mount_login_without_user_id, TestSession};

mod test_login_lifecycle {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_client_login_guard_call_and_expiry() {
        let server = MockServer::start().await;
        let token = mint_token("12", 3600);
        mount_login(&server, &token, "CLIENT", 12).await;

        let bearer = format!("Bearer {token}");
        Mock::given(method("GET"))
            .and(path("/api/reservations"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/reservations"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let t = TestSession::new(&server.uri());

        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert_eq!(
            outcome,
            LoginOutcome::Authenticated {
                role: Role::Client,
                redirect: "/search-services".to_string(),
            }
        );
        assert_eq!(t.store.user_id(), Some("12".to_string()));

        // landing bounces a client to search
        assert!(!t.session.guard().can_activate("/"));
        assert!(t.session.guard().can_activate("/review/4"));

        let client = t.session.api_client();
        let body: Value = client.get_json("/api/reservations").await.unwrap();
        assert_eq!(body, json!([{ "id": 1 }]));

        let err = client
            .get_json::<Value>("/api/reservations")
            .await
            .unwrap_err();
        assert!(err.is_session_expired());

        assert!(t.session.identity().is_empty());
        assert_eq!(
            t.notifier.messages(),
            vec!["Your session has expired, please log in again"]
        );
        assert_eq!(
            t.navigator.history(),
            vec!["/search-services", "/search-services", "/"]
        );

        // protected routes are now closed
        assert!(!t.session.guard().can_activate("/reservations"));
        assert_eq!(t.navigator.last_route(), Some("/".to_string()));
    }

    #[tokio::test]
    async fn test_provider_login_is_kept_off_review() {
        let server = MockServer::start().await;
        mount_login(&server, &mint_token("3", 3600), "PROVIDER", 3).await;

        let t = TestSession::new(&server.uri());
        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("marc@example.fr", "secret"))
            .await;
        assert!(outcome.is_authenticated());
        assert_eq!(t.session.current_role(), Some(Role::Provider));

        assert!(!t.session.guard().can_activate("/review/9"));
        assert!(!t.session.guard().can_activate("/"));
        assert!(t.session.guard().can_activate("/profile"));
        assert_eq!(t.navigator.history(), vec!["/profile", "/profile", "/profile"]);
    }

    #[tokio::test]
    async fn test_login_without_user_id_keeps_session_on_protected_route() {
        let server = MockServer::start().await;
        mount_login_without_user_id(&server, &mint_token("7", 3600), "CLIENT").await;

        let t = TestSession::new(&server.uri());
        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert!(outcome.is_authenticated());

        assert!(t.session.guard().can_activate("/search-services"));
        assert!(t.session.guard().can_activate("/reservations"));
        assert_eq!(t.store.user_id(), Some("7".to_string()));
        assert_eq!(t.navigator.history(), vec!["/search-services"]);
    }

    #[tokio::test]
    async fn test_next_login_overwrites_previous_user_id() {
        let server = MockServer::start().await;
        mount_login_without_user_id(&server, &mint_token("9", 3600), "CLIENT").await;

        let t = TestSession::new(&server.uri());
        t.store.set_user_id("7").unwrap();

        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert!(outcome.is_authenticated());

        assert_eq!(t.store.user_id(), Some("9".to_string()));
        assert!(t.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_store_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad" })))
            .mount(&server)
            .await;

        let t = TestSession::new(&server.uri());
        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "wrong"))
            .await;

        assert_eq!(
            outcome,
            LoginOutcome::Failed {
                message: "Incorrect email or password".to_string()
            }
        );
        assert!(t.session.identity().is_empty());
        assert!(t.navigator.history().is_empty());
        assert!(!t.session.guard().can_activate("/reservations"));
    }

    #[tokio::test]
    async fn test_token_bound_to_another_user_is_discarded() {
        let server = MockServer::start().await;
        // server answers with a token for user 5 but claims user 6
        mount_login(&server, &mint_token("5", 3600), "CLIENT", 6).await;

        let t = TestSession::new(&server.uri());
        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert!(outcome.is_authenticated());

        assert!(!t.session.is_authenticated());
        assert!(t.session.identity().is_empty());
    }
}

mod test_persistent_session {
    use super::*;

    #[tokio::test]
    async fn test_file_session_survives_restart_until_logout() {
        let server = MockServer::start().await;
        mount_login(&server, &mint_token("21", 3600), "CLIENT", 21).await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");

        let first = TestSession::with_store(&server.uri(), Arc::new(FileSessionStore::new(&file)));
        let outcome = first
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert!(outcome.is_authenticated());

        let second = TestSession::with_store(&server.uri(), Arc::new(FileSessionStore::new(&file)));
        assert!(second.session.is_authenticated());
        assert_eq!(second.session.current_role(), Some(Role::Client));

        second.session.logout();
        assert!(!first.session.is_authenticated());
        assert!(second.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_expired_file_session_is_wiped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        let store = FileSessionStore::new(&file);
        store.set_token(&mint_token("4", -60)).unwrap();
        store.set_user_role("CLIENT").unwrap();
        store.set_user_id("4").unwrap();

        let t = TestSession::with_store("http://127.0.0.1:1", Arc::new(store));

        assert!(!t.session.guard().can_activate("/reservations"));
        assert!(FileSessionStore::new(&file).identity().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_reports_connection_error() {
        let t = TestSession::new("http://127.0.0.1:1");
        let err = t
            .session
            .api_client()
            .get_json::<Value>("/api/reservations")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Http(_)));

        let outcome = t
            .session
            .login_flow()
            .perform_login(&Credentials::new("lea@example.fr", "secret"))
            .await;
        assert_eq!(
            outcome,
            LoginOutcome::Failed {
                message: "Unable to reach the server, check your connection".to_string()
            }
        );
    }
}

mod common;
