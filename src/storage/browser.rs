//! Browser `localStorage` / `sessionStorage` backend.
//!
//! The `Storage` handle is looked up through `web_sys::window()` on every
//! call so the store itself holds no JS values and stays `Send + Sync`.

use super::{KeyValueStore, StorageError};

/// Which browser storage area a [`BrowserStore`] targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageScope {
    /// `localStorage`: survives browser restarts.
    Durable,
    /// `sessionStorage`: cleared when the tab/browser session ends.
    Transient,
}

#[derive(Clone, Copy, Debug)]
pub struct BrowserStore {
    scope: StorageScope,
}

impl BrowserStore {
    #[must_use]
    pub fn local() -> Self {
        Self { scope: StorageScope::Durable }
    }

    #[must_use]
    pub fn session() -> Self {
        Self { scope: StorageScope::Transient }
    }

    fn storage(self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let storage = match self.scope {
            StorageScope::Durable => window.local_storage(),
            StorageScope::Transient => window.session_storage(),
        };
        storage
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("storage disabled".into()))
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }
}
