//! Session error types

use thiserror::Error;

/// Why a stored token was rejected.
///
/// Every variant except `Absent` causes the stored identity to be cleared.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token stored")]
    Absent,

    #[error("token has {0} segments, expected 3")]
    SegmentCount(usize),

    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token payload is not a JSON object")]
    NotAnObject,

    #[error("token payload has no subject claim")]
    MissingSubject,

    #[error("token expiry claim is not a number")]
    InvalidExpiry,

    #[error("token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },

    #[error("no user id stored to bind the token subject against")]
    MissingUserId,

    #[error("token subject {subject} does not match stored user id {stored}")]
    IdentityMismatch { subject: String, stored: String },
}

impl TokenError {
    /// Whether this rejection must wipe the stored identity.
    pub fn invalidates(&self) -> bool {
        !matches!(self, TokenError::Absent)
    }
}

/// Session store persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by the session subsystem to its callers
#[derive(Debug, Error)]
pub enum SessionError {
    /// Uniform error for any 401/403 seen by the interceptor.
    #[error("Your session has expired, please log in again")]
    SessionExpired,

    #[error("Token missing in server response")]
    TokenMissing,

    #[error("Invalid credentials: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Whether this is the interceptor's session-expired signal.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SessionError::SessionExpired)
    }
}
