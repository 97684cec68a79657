//! Session store: the single accessor for persisted identity keys
//!
//! Every component reads and writes `token`, `userRole` and `userId` through
//! [`SessionStore`]. Individual get/set calls are atomic; nothing spans keys.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::config::{SessionConfig, StoreKind};
use crate::error::{SessionError, StoreError};
use crate::types::StoredIdentity;

pub const TOKEN_KEY: &str = "token";
pub const USER_ROLE_KEY: &str = "userRole";
pub const USER_ID_KEY: &str = "userId";

/// Key-value storage for the stored identity
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Stored token; an empty string counts as absent.
    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    fn user_role(&self) -> Option<String> {
        self.get(USER_ROLE_KEY)
    }

    fn user_id(&self) -> Option<String> {
        self.get(USER_ID_KEY)
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.set(TOKEN_KEY, token)
    }

    fn set_user_role(&self, role: &str) -> Result<(), StoreError> {
        self.set(USER_ROLE_KEY, role)
    }

    fn set_user_id(&self, user_id: &str) -> Result<(), StoreError> {
        self.set(USER_ID_KEY, user_id)
    }

    fn identity(&self) -> StoredIdentity {
        StoredIdentity {
            token: self.get(TOKEN_KEY),
            user_role: self.get(USER_ROLE_KEY),
            user_id: self.get(USER_ID_KEY),
        }
    }

    /// Remove all identity keys.
    ///
    /// Keeps going after a failed removal and reports the first failure.
    fn clear(&self) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in [TOKEN_KEY, USER_ROLE_KEY, USER_ID_KEY] {
            if let Err(e) = self.remove(key) {
                tracing::warn!(error = %e, key, "Failed to remove session key");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory store, cloned handles share the same map
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given identity (mostly for tests)
    pub fn with_identity(token: &str, role: &str, user_id: &str) -> Self {
        let store = Self::new();
        {
            let mut entries = lock(&store.entries);
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
            entries.insert(USER_ROLE_KEY.to_string(), role.to_string());
            entries.insert(USER_ID_KEY.to_string(), user_id.to_string());
        }
        store
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON-file store that survives process restarts
///
/// The file holds one object, e.g. `{"token": "...", "userRole": "CLIENT", "userId": 42}`.
/// It is re-read on every access so several processes see each other's writes.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Loads the map for a mutation; a corrupt file is replaced, not fatal.
    fn load_for_write(&self) -> Result<Map<String, Value>, StoreError> {
        match self.load() {
            Ok(map) => Ok(map),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Discarding corrupt session file");
                Ok(Map::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let map = match self.load() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Failed to read session file");
                return None;
            }
        };
        match map.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock);
        let mut map = self.load_for_write()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock);
        let mut map = self.load_for_write()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// Session store factory
pub struct SessionStoreFactory;

impl SessionStoreFactory {
    /// Create a session store based on configuration
    pub fn create(config: &SessionConfig) -> Result<Arc<dyn SessionStore>, SessionError> {
        match config.store {
            StoreKind::Memory => {
                tracing::info!("Creating in-memory session store");
                Ok(Arc::new(MemorySessionStore::new()))
            }
            StoreKind::File => {
                let path = config.session_file.clone().ok_or_else(|| {
                    SessionError::Configuration(
                        "SERVICA_SESSION_FILE is required for the file store".to_string(),
                    )
                })?;
                tracing::info!(path = %path.display(), "Creating file session store");
                Ok(Arc::new(FileSessionStore::new(path)))
            }
        }
    }
}
