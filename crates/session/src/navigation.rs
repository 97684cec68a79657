//! Navigation side effects

use std::sync::{Arc, Mutex};

/// Moves the client to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Logs navigations through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "Navigating");
    }
}

/// Records every navigation, newest last
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_route(&self) -> Option<String> {
        self.history().pop()
    }

    /// Number of navigations to `route`
    pub fn count(&self, route: &str) -> usize {
        self.history().iter().filter(|r| *r == route).count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "Navigating");
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.to_string());
    }
}
