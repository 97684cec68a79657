//! Route guard
//!
//! Decides per navigation whether the target route may be activated, and
//! redirects when it may not.

use crate::context::SessionContext;
use crate::types::Role;
use crate::validator::TokenValidator;

/// Outcome of one guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Redirect(String),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allow)
    }
}

/// Navigation gatekeeper
#[derive(Clone)]
pub struct AuthGuard {
    validator: TokenValidator,
    context: SessionContext,
}

impl AuthGuard {
    pub fn new(validator: TokenValidator, context: SessionContext) -> Self {
        Self { validator, context }
    }

    /// Compute the decision without navigating.
    ///
    /// Still runs the validator, so an invalid token is cleared.
    pub fn decide(&self, target_url: &str) -> AuthDecision {
        let routes = self.context.routes();
        let authenticated = self.validator.is_token_valid();
        let role = if authenticated {
            self.context.store().user_role().map(|r| Role::parse(&r))
        } else {
            None
        };

        if routes.is_landing(target_url) {
            return match role {
                Some(Role::Provider) => AuthDecision::Redirect(routes.provider_profile.clone()),
                Some(Role::Client) => AuthDecision::Redirect(routes.client_search.clone()),
                _ => AuthDecision::Allow,
            };
        }

        if !authenticated {
            return AuthDecision::Redirect(routes.landing.clone());
        }

        if routes.is_review(target_url) && role.as_ref().is_some_and(Role::is_provider) {
            return AuthDecision::Redirect(routes.provider_profile.clone());
        }

        AuthDecision::Allow
    }

    /// Whether navigation to `target_url` may proceed; redirects when not.
    pub fn can_activate(&self, target_url: &str) -> bool {
        match self.decide(target_url) {
            AuthDecision::Allow => true,
            AuthDecision::Redirect(route) => {
                tracing::debug!(target_url, redirect = %route, "Route activation denied");
                self.context.navigator().navigate(&route);
                false
            }
        }
    }
}
