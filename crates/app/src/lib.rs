//! Servica command-line composition root
//!
//! Wires a file-backed [`Session`] and exposes one function per CLI command.
//! Each returns a serializable report so the binary only prints.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use servica_session::{
    Credentials, LoginOutcome, RecordingNavigator, Session, SessionConfig, SessionError, StoreKind,
    TokenClaims, TracingNotifier,
};

/// Session file used when none is configured
pub const DEFAULT_SESSION_FILE: &str = ".servica-session.json";

/// A session plus the navigator that records where it sent the user
pub struct App {
    pub session: Session,
    pub navigator: RecordingNavigator,
}

/// The CLI always persists: a memory store would forget the login on exit.
pub fn cli_config(mut config: SessionConfig) -> SessionConfig {
    if config.store == StoreKind::Memory {
        config.store = StoreKind::File;
    }
    if config.session_file.is_none() {
        config.session_file = Some(PathBuf::from(DEFAULT_SESSION_FILE));
    }
    config
}

/// Build the application from configuration
pub fn build_app(config: SessionConfig) -> Result<App, SessionError> {
    let navigator = RecordingNavigator::new();
    let session = Session::from_config(
        config,
        Arc::new(TracingNotifier),
        Arc::new(navigator.clone()),
    )?;
    Ok(App { session, navigator })
}

#[derive(Debug, Serialize)]
pub struct LoginReport {
    pub authenticated: bool,
    pub role: Option<String>,
    pub redirect: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub authenticated: bool,
    pub role: Option<String>,
    pub user_id: Option<String>,
    pub claims: Option<TokenClaims>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuardReport {
    pub url: String,
    pub allowed: bool,
    pub redirect: Option<String>,
}

pub async fn login(app: &App, email: &str, password: &str) -> LoginReport {
    let credentials = Credentials::new(email, password);
    match app.session.login_flow().perform_login(&credentials).await {
        LoginOutcome::Authenticated { role, redirect } => LoginReport {
            authenticated: true,
            role: Some(role.to_string()),
            redirect: Some(redirect),
            message: None,
        },
        LoginOutcome::Failed { message } => LoginReport {
            authenticated: false,
            role: None,
            redirect: None,
            message: Some(message),
        },
    }
}

/// Report on the stored session; an invalid token is cleared as a side effect.
pub fn status(app: &App) -> StatusReport {
    let identity = app.session.identity();
    match app.session.validator().validate() {
        Ok(claims) => StatusReport {
            authenticated: true,
            role: identity.user_role,
            user_id: identity.user_id,
            claims: Some(claims),
            reason: None,
        },
        Err(reason) => {
            if reason.invalidates() {
                if let Err(e) = app.session.context().store().clear() {
                    tracing::warn!(error = %e, "Failed to clear invalid session");
                }
            }
            StatusReport {
                authenticated: false,
                role: None,
                user_id: None,
                claims: None,
                reason: Some(reason.to_string()),
            }
        }
    }
}

pub fn guard(app: &App, url: &str) -> GuardReport {
    let before = app.navigator.history().len();
    let allowed = app.session.guard().can_activate(url);
    let redirect = if app.navigator.history().len() > before {
        app.navigator.last_route()
    } else {
        None
    };
    GuardReport {
        url: url.to_string(),
        allowed,
        redirect,
    }
}

pub async fn get(app: &App, path: &str) -> Result<Value, SessionError> {
    app.session.api_client().get_json(path).await
}

pub fn logout(app: &App) {
    app.session.logout();
}
