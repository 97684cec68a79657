//! Explicit collaborators shared by the interceptor, guard and login flow

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::error::SessionError;
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::routes::Routes;
use crate::store::SessionStore;

/// Collaborators every session component needs
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        routes: Routes,
    ) -> Self {
        Self {
            store,
            notifier,
            navigator,
            routes,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// `Bearer <token>` for the stored token, as-is (no trimming).
    pub fn bearer_header(&self) -> Option<HeaderValue> {
        let token = self.store.token()?;
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Stored token is not a valid header value");
                None
            }
        }
    }

    /// Set the Authorization header when a token is stored.
    ///
    /// Replaces any existing Authorization header so exactly one is sent.
    pub fn authorize(&self, headers: &mut HeaderMap) {
        if let Some(value) = self.bearer_header() {
            headers.insert(AUTHORIZATION, value);
        }
    }

    /// React to a response status.
    ///
    /// 401 and 403 expire the session and yield `SessionExpired`; every
    /// other status is left to the caller.
    pub fn check_status(&self, status: StatusCode) -> Result<(), SessionError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::info!(status = status.as_u16(), "Request rejected, expiring session");
            self.expire_session();
            return Err(SessionError::SessionExpired);
        }
        Ok(())
    }

    /// Clear the stored identity, tell the user, go home.
    pub fn expire_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
        self.notifier
            .warn(&SessionError::SessionExpired.to_string());
        self.navigator.navigate(&self.routes.home);
    }

    /// Clear the stored identity and go home, without a warning.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear session on logout");
        }
        tracing::info!("Logged out");
        self.navigator.navigate(&self.routes.home);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
