//! Client session integrity for the Servica marketplace
//!
//! Provides the session store, token validation with optional identity
//! binding, an auth interceptor (as a `tower` layer and as an API client),
//! the route guard, and the login flow.

mod claims;
mod client;
mod config;
mod context;
mod error;
mod guard;
mod interceptor;
mod login;
mod navigation;
mod notify;
mod routes;
mod session;
mod store;
mod types;
mod validator;

pub use claims::{decode_claims, TokenClaims};
pub use client::ApiClient;
pub use config::{SessionConfig, StoreKind};
pub use context::SessionContext;
pub use error::{SessionError, StoreError, TokenError};
pub use guard::{AuthDecision, AuthGuard};
pub use interceptor::{AuthLayer, AuthService};
pub use login::{
    login_error_message, Credentials, LoginErrorResponse, LoginFlow, LoginOutcome, LoginResponse,
    LOGIN_PATH,
};
pub use navigation::{Navigator, RecordingNavigator, TracingNavigator};
pub use notify::{
    ChannelNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier,
};
pub use routes::Routes;
pub use session::Session;
pub use store::{
    FileSessionStore, MemorySessionStore, SessionStore, SessionStoreFactory, TOKEN_KEY,
    USER_ID_KEY, USER_ROLE_KEY,
};
pub use types::{Role, StoredIdentity};
pub use validator::{Clock, FixedClock, SystemClock, TokenValidator, ValidationPolicy};
