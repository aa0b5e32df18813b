use crate::core::{Bytes, KeyRef};
use std::collections::BTreeMap;

/// Volatile in-memory key value store.
///
/// A caller-owned mapping with the same last-write-wins semantics as
/// [`crate::LogStore`] but no persistence. Useful as a fallback backend
/// before a log file exists and as a lightweight test double. It is an
/// explicitly constructed value, never ambient global state.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemStore {
    map: BTreeMap<Bytes, Bytes>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> MemStore {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Returns the current value for `key`, if any.
    pub fn get(&self, key: KeyRef) -> Option<Bytes> {
        self.map.get(key).cloned()
    }

    /// Stores `val` under `key`, replacing any prior value.
    pub fn put(&mut self, key: Bytes, val: Bytes) {
        self.map.insert(key, val);
    }

    /// Removes `key` and returns its value, if it was present.
    pub fn delete(&mut self, key: KeyRef) -> Option<Bytes> {
        self.map.remove(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get() {
        let mut store = MemStore::new();
        store.put(b"key1".to_vec(), b"value1".to_vec());
        assert_eq!(store.get(b"key1"), Some(b"value1".to_vec()));
        assert_eq!(store.get(b"key2"), None);
    }

    #[test]
    fn put_overwrites() {
        let mut store = MemStore::new();
        store.put(b"key1".to_vec(), b"value1".to_vec());
        store.put(b"key1".to_vec(), b"value2".to_vec());
        assert_eq!(store.get(b"key1"), Some(b"value2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes() {
        let mut store = MemStore::new();
        store.put(b"key1".to_vec(), b"value1".to_vec());
        assert_eq!(store.delete(b"key1"), Some(b"value1".to_vec()));
        assert_eq!(store.get(b"key1"), None);
        assert!(store.is_empty());
    }
}
