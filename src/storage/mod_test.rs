use std::sync::Mutex;

use super::test_helpers::FailingStore;
use super::*;

/// Backend whose reads fail but which records removals.
#[derive(Default)]
struct UnreadableStore {
    removed: Mutex<Vec<String>>,
}

impl KeyValueStore for UnreadableStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("read denied".into()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.removed.lock().unwrap().push(key.to_owned());
        Ok(())
    }
}

fn memory_backed() -> (Arc<MemoryStore>, PersistentStore) {
    let backend = Arc::new(MemoryStore::new());
    let store = PersistentStore::new(backend.clone());
    (backend, store)
}

// =============================================================
// JSON values
// =============================================================

#[test]
fn write_json_then_read_json() {
    let (_, store) = memory_backed();
    assert!(store.write_json("k", &serde_json::json!({ "a": 1 })));
    let value: serde_json::Value = store.read_json("k").unwrap();
    assert_eq!(value["a"], 1);
}

#[test]
fn read_json_missing_key_is_none() {
    let (_, store) = memory_backed();
    assert!(store.read_json::<serde_json::Value>("missing").is_none());
}

#[test]
fn read_json_unparseable_value_is_removed() {
    let (backend, store) = memory_backed();
    backend.set_item("k", "{not json").unwrap();

    assert!(store.read_json::<serde_json::Value>("k").is_none());
    assert_eq!(backend.get_item("k").unwrap(), None);
}

#[test]
fn read_json_wrong_shape_is_removed() {
    let (backend, store) = memory_backed();
    backend.set_item("k", "\"just a string\"").unwrap();

    assert!(store.read_json::<Vec<u32>>("k").is_none());
    assert!(backend.is_empty());
}

// =============================================================
// Raw values
// =============================================================

#[test]
fn write_raw_then_remove() {
    let (backend, store) = memory_backed();
    assert!(store.write_raw("flag", "1"));
    assert_eq!(store.read_raw("flag").as_deref(), Some("1"));

    store.remove("flag");
    assert!(store.read_raw("flag").is_none());
    assert!(backend.is_empty());
}

#[test]
fn remove_missing_key_is_noop() {
    let (_, store) = memory_backed();
    store.remove("never-written");
    assert!(store.read_raw("never-written").is_none());
}

// =============================================================
// Backend failures never escape
// =============================================================

#[test]
fn failing_backend_reads_as_absent() {
    let store = PersistentStore::new(Arc::new(FailingStore));
    assert!(store.read_raw("k").is_none());
    assert!(store.read_json::<serde_json::Value>("k").is_none());
}

#[test]
fn failing_backend_write_reports_false() {
    let store = PersistentStore::new(Arc::new(FailingStore));
    assert!(!store.write_raw("k", "v"));
    assert!(!store.write_json("k", &1));
    store.remove("k");
}

#[test]
fn failed_read_removes_the_key() {
    let backend = Arc::new(UnreadableStore::default());
    let store = PersistentStore::new(backend.clone());

    assert!(store.read_raw("silkmall.auth").is_none());
    assert!(store.read_json::<serde_json::Value>("silkmall.guest-mode").is_none());

    assert_eq!(*backend.removed.lock().unwrap(), vec!["silkmall.auth".to_owned(), "silkmall.guest-mode".to_owned()]);
}
