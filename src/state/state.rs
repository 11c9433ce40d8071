//! Key-value storage and overlay abstractions.
//!
//! The [`State`] trait defines the interface for key-value storage, while
//! [`OverlayState`] enables transactional writes that are committed on success
//! or discarded on error. [`MemoryState`] is the in-process store a router runs
//! on by default.

use crate::types::hash::Hash;
use std::collections::BTreeMap;

/// A single pending write: `Some(value)` to store, `None` to delete.
pub type Write = (Hash, Option<Vec<u8>>);

/// Key-value storage interface.
///
/// Keys are always hashes so that balances, owner sets and contract storage
/// can share one flat namespace.
pub trait State {
    /// Retrieves a value by key, returning `None` if the key does not exist.
    fn get(&self, key: Hash) -> Option<Vec<u8>>;
    /// Stores a key-value pair, overwriting any existing value.
    fn push(&mut self, key: Hash, value: Vec<u8>);
    /// Removes a key from storage.
    fn delete(&mut self, key: Hash);

    fn contains_key(&self, key: Hash) -> bool {
        self.get(key).is_some()
    }

    /// Applies writes collected by an overlay, in order.
    fn apply_batch(&mut self, writes: Vec<Write>) {
        for (key, value) in writes {
            match value {
                Some(value) => self.push(key, value),
                None => self.delete(key),
            }
        }
    }
}

/// Write-buffering overlay on top of a base storage.
///
/// Reads fall through to the base for keys not yet written. Nothing reaches
/// the base until [`OverlayState::into_writes`] is applied by the owner.
pub struct OverlayState<'a> {
    base: &'a dyn State,
    writes: BTreeMap<Hash, Option<Vec<u8>>>,
}

impl<'a> OverlayState<'a> {
    /// Creates a new overlay backed by the given base storage.
    pub fn new(base: &'a dyn State) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched so far.
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Consumes the overlay and returns the pending writes.
    pub fn into_writes(self) -> Vec<Write> {
        self.writes.into_iter().collect()
    }
}

impl State for OverlayState<'_> {
    fn get(&self, key: Hash) -> Option<Vec<u8>> {
        if let Some(v) = self.writes.get(&key) {
            return v.clone();
        }
        self.base.get(key)
    }

    fn push(&mut self, key: Hash, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    fn delete(&mut self, key: Hash) {
        self.writes.insert(key, None);
    }
}

/// Ordered in-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    data: BTreeMap<Hash, Vec<u8>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Vec<(Hash, Vec<u8>)>) -> Self {
        Self {
            data: data.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl State for MemoryState {
    fn get(&self, key: Hash) -> Option<Vec<u8>> {
        self.data.get(&key).cloned()
    }

    fn push(&mut self, key: Hash, value: Vec<u8>) {
        self.data.insert(key, value);
    }

    fn delete(&mut self, key: Hash) {
        self.data.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &[u8]) -> Hash {
        Hash::sha3().chain(s).finalize()
    }

    #[test]
    fn overlay_reads_through_to_base() {
        let base = MemoryState::with_data(vec![(h(b"key"), b"value".to_vec())]);
        let overlay = OverlayState::new(&base);
        assert_eq!(overlay.get(h(b"key")), Some(b"value".to_vec()));
        assert_eq!(overlay.get(h(b"missing")), None);
        assert!(overlay.contains_key(h(b"key")));
    }

    #[test]
    fn overlay_write_shadows_base() {
        let base = MemoryState::with_data(vec![(h(b"key"), b"old".to_vec())]);
        let mut overlay = OverlayState::new(&base);
        overlay.push(h(b"key"), b"new".to_vec());
        assert_eq!(overlay.get(h(b"key")), Some(b"new".to_vec()));
        assert_eq!(base.get(h(b"key")), Some(b"old".to_vec()));
    }

    #[test]
    fn overlay_delete_returns_none() {
        let base = MemoryState::with_data(vec![(h(b"key"), b"value".to_vec())]);
        let mut overlay = OverlayState::new(&base);
        overlay.delete(h(b"key"));
        assert_eq!(overlay.get(h(b"key")), None);
        assert_eq!(overlay.pending(), 1);
    }

    #[test]
    fn nested_overlay_sees_parent_writes() {
        let base = MemoryState::new();
        let mut outer = OverlayState::new(&base);
        outer.push(h(b"a"), b"1".to_vec());
        let mut inner = OverlayState::new(&outer);
        assert_eq!(inner.get(h(b"a")), Some(b"1".to_vec()));
        inner.push(h(b"b"), b"2".to_vec());
        let writes = inner.into_writes();
        outer.apply_batch(writes);
        assert_eq!(outer.get(h(b"b")), Some(b"2".to_vec()));
    }

    #[test]
    fn apply_batch_commits_inserts_and_deletes() {
        let mut base = MemoryState::with_data(vec![(h(b"gone"), b"x".to_vec())]);
        let writes = {
            let mut overlay = OverlayState::new(&base);
            overlay.push(h(b"a"), b"1".to_vec());
            overlay.delete(h(b"gone"));
            overlay.into_writes()
        };
        base.apply_batch(writes);
        assert_eq!(base.get(h(b"a")), Some(b"1".to_vec()));
        assert!(!base.contains_key(h(b"gone")));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn overlay_write_after_delete_restores_value() {
        let base = MemoryState::new();
        let mut overlay = OverlayState::new(&base);
        overlay.push(h(b"key"), b"first".to_vec());
        overlay.delete(h(b"key"));
        overlay.push(h(b"key"), b"second".to_vec());
        assert_eq!(overlay.get(h(b"key")), Some(b"second".to_vec()));
    }
}
