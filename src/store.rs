//! In-memory resource store
//!
//! Simulates the "remote system" behind the mock provider across a single
//! test: values written on apply can be read back by reads, data sources and
//! imports. The store is schema-agnostic; callers decide what shape the
//! stored values take.

use crate::types::DynamicValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// ResourceStore maps resource identifiers to their stored values.
///
/// Handles are cheap clones of the same underlying map, so a test can keep
/// one handle to seed and inspect entries while the provider holds another.
/// Entries never expire; the store lives as long as the test that made it.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    entries: Arc<Mutex<HashMap<String, DynamicValue>>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored value, or None when the id was never
    /// written (or has been deleted). Absence is not an error.
    pub fn get(&self, id: &str) -> Option<DynamicValue> {
        self.lock().get(id).cloned()
    }

    pub fn set(&self, id: impl Into<String>, value: DynamicValue) {
        let id = id.into();
        tracing::trace!(%id, "storing resource value");
        self.lock().insert(id, value);
    }

    pub fn delete(&self, id: &str) {
        tracing::trace!(%id, "deleting resource value");
        self.lock().remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking test must not wedge the store for the teardown checks that
    // run after it, so poisoning is ignored.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DynamicValue>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dynamic;

    #[test]
    fn set_then_get_returns_value() {
        let store = ResourceStore::new();
        let value = DynamicValue::object([("id", Dynamic::String("abc".to_string()))]);

        store.set("abc", value.clone());

        assert_eq!(store.get("abc"), Some(value));
        assert!(store.contains("abc"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_of_unwritten_id_is_none() {
        let store = ResourceStore::new();
        assert_eq!(store.get("never-written"), None);
        assert!(!store.contains("never-written"));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_removes_entry() {
        let store = ResourceStore::new();
        store.set("abc", DynamicValue::null());
        store.delete("abc");

        assert_eq!(store.get("abc"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let store = ResourceStore::new();
        let handle = store.clone();

        handle.set("abc", DynamicValue::null());

        assert!(store.contains("abc"));
    }

    #[test]
    fn set_overwrites_existing_value() {
        let store = ResourceStore::new();
        store.set("abc", DynamicValue::object([("value", Dynamic::String("old".into()))]));
        store.set("abc", DynamicValue::object([("value", Dynamic::String("new".into()))]));

        let stored = store.get("abc").unwrap();
        assert_eq!(stored.attr("value").and_then(Dynamic::as_str), Some("new"));
        assert_eq!(store.len(), 1);
    }
}
