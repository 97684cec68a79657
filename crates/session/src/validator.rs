//! Token validation against the session store
//!
//! One validator serves both policies: expiry-only (`basic`) and expiry plus
//! identity binding (`strict`). Any rejection other than "no token" wipes the
//! stored identity before returning.

use std::sync::Arc;

use crate::claims::{decode_claims, TokenClaims};
use crate::error::TokenError;
use crate::store::SessionStore;

/// Source of the current time in seconds since epoch
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Validation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Require the token subject to equal the stored user id
    pub enforce_identity_binding: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self {
            enforce_identity_binding: true,
        }
    }

    pub fn basic() -> Self {
        Self {
            enforce_identity_binding: false,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Validates the stored token
#[derive(Clone)]
pub struct TokenValidator {
    store: Arc<dyn SessionStore>,
    policy: ValidationPolicy,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    pub fn new(store: Arc<dyn SessionStore>, policy: ValidationPolicy) -> Self {
        Self {
            store,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Check the stored token without touching the store.
    pub fn validate(&self) -> Result<TokenClaims, TokenError> {
        let token = self.store.token().ok_or(TokenError::Absent)?;
        let claims = decode_claims(&token)?;

        let now = self.clock.now();
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                exp: claims.exp.unwrap_or_default(),
                now,
            });
        }

        if self.policy.enforce_identity_binding {
            let stored = self
                .store
                .user_id()
                .filter(|id| !id.is_empty())
                .ok_or(TokenError::MissingUserId)?;
            if stored != claims.sub {
                return Err(TokenError::IdentityMismatch {
                    subject: claims.sub,
                    stored,
                });
            }
        }

        Ok(claims)
    }

    /// Whether the stored token is usable.
    ///
    /// A rejected token clears the whole stored identity. Never fails.
    pub fn is_token_valid(&self) -> bool {
        match self.validate() {
            Ok(_) => true,
            Err(reason) => {
                if reason.invalidates() {
                    tracing::debug!(reason = %reason, "Invalidating stored session");
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "Failed to clear invalid session");
                    }
                }
                false
            }
        }
    }

    #[mutants::skip] // Negation of is_token_valid
    pub fn should_redirect_to_login(&self) -> bool {
        !self.is_token_valid()
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
