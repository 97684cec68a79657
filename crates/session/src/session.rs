//! Session facade
//!
//! Builds every session component from one config and one set of
//! collaborators, so the store, validator and routes are shared.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::SessionError;
use crate::guard::AuthGuard;
use crate::interceptor::AuthLayer;
use crate::login::LoginFlow;
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::store::{SessionStore, SessionStoreFactory};
use crate::types::{Role, StoredIdentity};
use crate::validator::{Clock, TokenValidator, ValidationPolicy};

/// Entry point to the session subsystem
#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    context: SessionContext,
    validator: TokenValidator,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let context = SessionContext::new(store.clone(), notifier, navigator, config.routes.clone());
        let policy = ValidationPolicy {
            enforce_identity_binding: config.enforce_identity_binding,
        };
        let validator = TokenValidator::new(store, policy);
        Self {
            config,
            context,
            validator,
        }
    }

    /// Build with the store selected by `config.store`
    pub fn from_config(
        config: SessionConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let store = SessionStoreFactory::create(&config)?;
        Ok(Self::new(config, store, notifier, navigator))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.validator = self.validator.with_clock(clock);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn guard(&self) -> AuthGuard {
        AuthGuard::new(self.validator.clone(), self.context.clone())
    }

    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.context.clone())
    }

    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(&self.config, self.context.clone())
    }

    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(&self.config, self.context.clone())
    }

    #[mutants::skip] // Delegates to TokenValidator::is_token_valid
    pub fn is_authenticated(&self) -> bool {
        self.validator.is_token_valid()
    }

    /// Role of the authenticated user, `None` when the token is not valid
    pub fn current_role(&self) -> Option<Role> {
        if !self.validator.is_token_valid() {
            return None;
        }
        self.context.store().user_role().map(|role| Role::parse(&role))
    }

    pub fn identity(&self) -> StoredIdentity {
        self.context.store().identity()
    }

    #[mutants::skip] // Delegates to SessionContext::logout
    pub fn logout(&self) {
        self.context.logout();
    }
}
