//! Key/value persistence behind the session record.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session uses two scopes: a durable one (survives restarts) for the
//! authenticated payload, and a transient one (lives as long as the browsing
//! session) for the guest-mode flag. Backends implement [`KeyValueStore`];
//! [`PersistentStore`] wraps a backend and never lets a failure escape.
//!
//! ERROR HANDLING
//! ==============
//! Every backend failure is logged and treated as "value absent". A value
//! that cannot be parsed is removed so the next read does not trip on it
//! again.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

#[cfg(feature = "hydrate")]
pub mod browser;
pub mod file;
pub mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(feature = "hydrate")]
pub use browser::BrowserStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached (no window, access denied, I/O).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backend refused the write (quota exceeded and similar).
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
    /// A value could not be (de)serialized.
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw string key/value backend.
///
/// Mirrors the browser `Storage` interface so native and browser builds can
/// share the session logic.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Infallible adapter over a [`KeyValueStore`].
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read the raw string stored at `key`.
    ///
    /// A failed read drops the key so the next read does not fail the same way.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%key, error = %e, "storage read failed; removing key");
                self.remove(key);
                None
            }
        }
    }

    /// Read and parse the JSON value stored at `key`.
    ///
    /// Unparseable values are removed.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding unparseable stored value");
                self.remove(key);
                None
            }
        }
    }

    /// Store a raw string at `key`. Returns whether the write landed.
    pub fn write_raw(&self, key: &str, value: &str) -> bool {
        match self.backend.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%key, error = %e, "storage write failed");
                false
            }
        }
    }

    /// Serialize `value` as JSON and store it at `key`. Returns whether the
    /// write landed.
    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.write_raw(key, &raw),
            Err(e) => {
                tracing::warn!(%key, error = %e, "storage serialization failed");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            tracing::warn!(%key, error = %e, "storage remove failed");
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
