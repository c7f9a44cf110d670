//! Navigation capability injected into the router and HTTP transport.
//!
//! Keeps `window.location` access out of the guard and transport logic so both
//! can run without a browsing context.

use std::sync::{Mutex, PoisonError};

/// Access to the current location and full-page navigation.
pub trait Navigator: Send + Sync {
    /// Current path + query.
    fn current_location(&self) -> String;

    /// Navigate to `path` (path + query), replacing the current view.
    fn force_navigate(&self, path: &str);
}

/// Navigator that only records where it was sent.
///
/// Used by the command-line front end and tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self { current: Mutex::new(start.into()), history: Mutex::new(Vec::new()) }
    }

    /// Every forced navigation so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn force_navigate(&self, path: &str) {
        tracing::debug!(%path, "navigate");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_owned();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}

/// Navigator over `window.location`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn current_location(&self) -> String {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return "/".to_owned();
        };
        let path = location.pathname().unwrap_or_else(|_| "/".to_owned());
        let search = location.search().unwrap_or_default();
        format!("{path}{search}")
    }

    fn force_navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(path) {
                tracing::warn!(%path, error = ?e, "navigation failed");
            }
        }
    }
}
