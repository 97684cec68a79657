//! Session configuration
//!
//! Loaded from environment variables (and an optional `.env` file).

use std::path::PathBuf;

use crate::error::SessionError;
use crate::routes::Routes;

/// Which session store backs the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
}

/// Session subsystem configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the marketplace API
    pub api_base_url: String,
    /// Bind the token subject to the stored user id
    pub enforce_identity_binding: bool,
    pub store: StoreKind,
    /// Session file for `StoreKind::File`
    pub session_file: Option<PathBuf>,
    pub routes: Routes,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            enforce_identity_binding: true,
            store: StoreKind::Memory,
            session_file: None,
            routes: Routes::default(),
        }
    }
}

impl SessionConfig {
    /// Create session config from environment variables
    pub fn from_env() -> Result<Self, SessionError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url =
            std::env::var("SERVICA_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let enforce_identity_binding = match std::env::var("SERVICA_ENFORCE_IDENTITY_BINDING") {
            Ok(value) => parse_flag("SERVICA_ENFORCE_IDENTITY_BINDING", &value)?,
            Err(_) => defaults.enforce_identity_binding,
        };

        let session_file = std::env::var("SERVICA_SESSION_FILE").ok().map(PathBuf::from);

        let store = match std::env::var("SERVICA_STORE") {
            Ok(value) => match value.as_str() {
                "memory" => StoreKind::Memory,
                "file" => StoreKind::File,
                other => {
                    return Err(SessionError::Configuration(format!(
                        "Unknown session store: {}. Supported stores: memory, file",
                        other
                    )))
                }
            },
            Err(_) if session_file.is_some() => StoreKind::File,
            Err(_) => StoreKind::Memory,
        };

        let mut routes = defaults.routes;
        for (var, slot) in [
            ("SERVICA_ROUTE_LANDING", &mut routes.landing),
            ("SERVICA_ROUTE_HOME", &mut routes.home),
            ("SERVICA_ROUTE_PROFILE", &mut routes.provider_profile),
            ("SERVICA_ROUTE_SEARCH", &mut routes.client_search),
            ("SERVICA_ROUTE_REVIEW", &mut routes.review),
        ] {
            if let Ok(value) = std::env::var(var) {
                *slot = value;
            }
        }

        Ok(Self {
            api_base_url,
            enforce_identity_binding,
            store,
            session_file,
            routes,
        })
    }

    /// Absolute URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool, SessionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(SessionError::Configuration(format!(
            "{} must be a boolean, got {:?}",
            var, other
        ))),
    }
}
