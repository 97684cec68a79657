//! Session identity types
//!
//! Lightweight views of what the client keeps about the logged-in user.

use serde::Serialize;

/// Marketplace role stored alongside the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Role {
    Client,
    Provider,
    Admin,
    /// Any other value the server sent, including the empty string.
    Unknown(String),
}

impl Role {
    /// Parse the stored `userRole` value
    pub fn parse(value: &str) -> Self {
        match value {
            "CLIENT" => Role::Client,
            "PROVIDER" => Role::Provider,
            "ADMIN" => Role::Admin,
            other => Role::Unknown(other.to_string()),
        }
    }

    /// Wire form, as stored under `userRole`
    pub fn as_str(&self) -> &str {
        match self {
            Role::Client => "CLIENT",
            Role::Provider => "PROVIDER",
            Role::Admin => "ADMIN",
            Role::Unknown(other) => other,
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Role::Provider)
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Role::Client)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the three stored identity keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredIdentity {
    pub token: Option<String>,
    pub user_role: Option<String>,
    pub user_id: Option<String>,
}

impl StoredIdentity {
    /// Role parsed from `user_role`, if any was stored
    pub fn role(&self) -> Option<Role> {
        self.user_role.as_deref().map(Role::parse)
    }

    /// True when none of the keys hold a value
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_role.is_none() && self.user_id.is_none()
    }
}
