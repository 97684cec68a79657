//! Login flow
//!
//! Posts credentials, stores the issued token and role, then navigates by
//! role. Some servers answer 200/201 with a body the client fails to parse;
//! those responses reach the error handler, which recovers the token from the
//! raw text instead of reporting a failure.
//!
//! Failures are reported through the notifier and returned as
//! [`LoginOutcome::Failed`], never as a panic or error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::claims::decode_claims;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::SessionError;
use crate::store::USER_ID_KEY;
use crate::types::Role;

/// Login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Login form payload
#[derive(Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user_role: Option<String>,
    /// Number or string, stored as a string
    pub user_id: Option<Value>,
}

impl LoginResponse {
    /// Lenient extraction from an arbitrary JSON value
    fn from_value(value: &Value) -> Self {
        Self {
            token: value.get("token").and_then(Value::as_str).map(str::to_string),
            user_role: value
                .get("userRole")
                .and_then(Value::as_str)
                .map(str::to_string),
            user_id: value.get("userId").filter(|id| !id.is_null()).cloned(),
        }
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    fn user_id_string(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Failed login as seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct LoginErrorResponse {
    /// HTTP status, 0 when the server could not be reached
    pub status: u16,
    /// Error payload: the server's JSON body, or `{"text": raw}` when the
    /// body was not parseable
    pub error: Value,
}

impl LoginErrorResponse {
    pub fn new(status: u16, error: Value) -> Self {
        Self { status, error }
    }

    /// Transport failure before any response arrived
    pub fn unreachable() -> Self {
        Self::new(0, Value::Null)
    }

    /// `message` field of the server's error body
    pub fn server_message(&self) -> Option<&str> {
        self.error
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Token recovered from a 200/201 the client failed to parse
    fn recover(&self) -> Option<LoginResponse> {
        if let Some(text) = self.error.get("text").and_then(Value::as_str) {
            if let Ok(parsed) = serde_json::from_str::<Value>(text) {
                let response = LoginResponse::from_value(&parsed);
                if response.token().is_some() {
                    return Some(response);
                }
            }
        }

        let response = LoginResponse::from_value(&self.error);
        response.token().is_some().then_some(response)
    }
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { role: Role, redirect: String },
    Failed { message: String },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

/// User-facing message for a failed login
pub fn login_error_message(status: u16, server_message: Option<&str>) -> String {
    match status {
        401 => "Incorrect email or password".to_string(),
        403 => "Access denied: you are not authorized".to_string(),
        404 => "Service unavailable, please try again later".to_string(),
        500 => "Internal server error, please try again later".to_string(),
        0 => "Unable to reach the server, check your connection".to_string(),
        _ => server_message
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown connection error".to_string()),
    }
}

/// Login service
#[derive(Clone, Debug)]
pub struct LoginFlow {
    http: reqwest::Client,
    login_url: String,
    context: SessionContext,
}

impl LoginFlow {
    pub fn new(config: &SessionConfig, context: SessionContext) -> Self {
        Self::with_client(reqwest::Client::new(), config, context)
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &SessionConfig,
        context: SessionContext,
    ) -> Self {
        Self {
            http,
            login_url: config.api_url(LOGIN_PATH),
            context,
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Validate, post and handle the credentials.
    pub async fn perform_login(&self, credentials: &Credentials) -> LoginOutcome {
        if let Err(e) = credentials.validate() {
            let message = SessionError::Validation(e.to_string()).to_string();
            tracing::debug!(error = %e, "Login form rejected");
            return self.fail(message);
        }

        match self.post(credentials).await {
            Ok(response) => self.handle_login_success(&response),
            Err(error) => self.handle_login_error(&error),
        }
    }

    async fn post(&self, credentials: &Credentials) -> Result<LoginResponse, LoginErrorResponse> {
        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.login_url, "Login request failed");
                LoginErrorResponse::unreachable()
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read login response body");
            LoginErrorResponse::new(status.as_u16(), Value::Null)
        })?;

        if status.is_success() {
            return serde_json::from_str::<LoginResponse>(&text).map_err(|e| {
                tracing::debug!(error = %e, status = status.as_u16(), "Login response failed to parse");
                LoginErrorResponse::new(status.as_u16(), json!({ "text": text }))
            });
        }

        let error = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));
        Err(LoginErrorResponse::new(status.as_u16(), error))
    }

    /// Store the issued token and role, then navigate by role.
    pub fn handle_login_success(&self, response: &LoginResponse) -> LoginOutcome {
        let Some(token) = response.token() else {
            return self.token_missing();
        };
        let role_value = response.user_role.clone().unwrap_or_default();

        // the body's userId wins, else the token subject; a previous user's id never survives
        let user_id = response.user_id_string().or_else(|| match decode_claims(token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::debug!(error = %e, "Issued token has no readable subject");
                None
            }
        });

        let store = self.context.store();
        let stored = store
            .set_token(token)
            .and_then(|_| store.set_user_role(&role_value))
            .and_then(|_| match &user_id {
                Some(user_id) => store.set_user_id(user_id),
                None => store.remove(USER_ID_KEY),
            });
        if let Err(e) = stored {
            tracing::error!(error = %e, "Failed to persist session after login");
            return self.fail(SessionError::Store(e).to_string());
        }

        let role = Role::parse(&role_value);
        let routes = self.context.routes();
        let redirect = match role {
            Role::Client => routes.client_search.clone(),
            Role::Provider => routes.provider_profile.clone(),
            Role::Admin | Role::Unknown(_) => routes.home.clone(),
        };

        tracing::info!(role = %role, redirect = %redirect, "Login succeeded");
        self.context.navigator().navigate(&redirect);
        LoginOutcome::Authenticated { role, redirect }
    }

    /// Recover 200/201 responses, otherwise report the failure.
    pub fn handle_login_error(&self, error: &LoginErrorResponse) -> LoginOutcome {
        if matches!(error.status, 200 | 201) {
            tracing::debug!(status = error.status, "Recovering token from unparsed login response");
            return match error.recover() {
                Some(response) => self.handle_login_success(&response),
                None => self.token_missing(),
            };
        }

        let message = login_error_message(error.status, error.server_message());
        tracing::warn!(status = error.status, message = %message, "Login failed");
        self.fail(message)
    }

    fn token_missing(&self) -> LoginOutcome {
        tracing::warn!("Login response carried no token");
        self.fail(SessionError::TokenMissing.to_string())
    }

    fn fail(&self, message: String) -> LoginOutcome {
        self.context.notifier().error(&message);
        LoginOutcome::Failed { message }
    }
}
