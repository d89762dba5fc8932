//! Thread-safe store over the persistent trie

use super::ValueGuard;
use crate::trie::Trie;
use parking_lot::Mutex;
use std::any::Any;
use tracing::{debug, trace};

/// A concurrent key-value store
///
/// Reads clone the current root under a short lock and then walk it with no
/// lock held. Writes are serialized end to end by a separate writer lock, build
/// the next version by path copying, and publish it by swapping the root.
///
/// Lock order: `write_lock` is always taken before `root`. Readers only ever
/// take `root`.
///
/// Both locks are `parking_lot` mutexes, which do not poison; a panic while
/// holding one simply releases it.
#[derive(Debug, Default)]
pub struct TrieStore {
    /// Publish lock: guards only the current root and its version number
    root: Mutex<Published>,
    /// Writer lock: at most one put or remove runs at a time
    write_lock: Mutex<()>,
}

#[derive(Debug, Default)]
struct Published {
    trie: Trie,
    version: u64,
}

impl TrieStore {
    /// Create an empty store
    pub fn new() -> Self {
        TrieStore::default()
    }

    /// Create a store whose current version is `trie`
    pub fn from_trie(trie: Trie) -> Self {
        TrieStore {
            root: Mutex::new(Published { trie, version: 0 }),
            write_lock: Mutex::new(()),
        }
    }

    /// Take a consistent snapshot of the current version
    pub fn snapshot(&self) -> Trie {
        let published = self.root.lock();
        trace!(version = published.version, "snapshot taken");
        published.trie.clone()
    }

    /// Number of versions published since the store was created
    pub fn version(&self) -> u64 {
        self.root.lock().version
    }

    /// Number of values in the current version
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the current version holds no values
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Get a value by key
    ///
    /// Returns `None` if the key is absent or holds a value of another type.
    /// The returned guard keeps the version it was read from alive, so it
    /// may be older than versions published after this call began.
    pub fn get<T: Any + Send + Sync>(&self, key: impl AsRef<[u8]>) -> Option<ValueGuard<T>> {
        let snapshot = self.snapshot();
        let value = snapshot.get_value(key)?.downcast_arc::<T>()?;
        Some(ValueGuard::new(snapshot, value))
    }

    /// Store a value, overwriting any previous value at `key`
    pub fn put<T: Any + Send + Sync>(&self, key: impl AsRef<[u8]>, value: T) {
        let key = key.as_ref();
        let _writer = self.write_lock.lock();

        let base = self.snapshot();
        let next = base.put(key, value);
        self.publish(next, key.len());
    }

    /// Remove the value at `key`
    ///
    /// Returns `false`, and publishes nothing, if there was no value to remove.
    pub fn remove(&self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        let _writer = self.write_lock.lock();

        let base = self.snapshot();
        let next = base.remove(key);
        if Trie::ptr_eq(&base, &next) {
            trace!(key_len = key.len(), "remove of absent key");
            return false;
        }

        self.publish(next, key.len());
        true
    }

    // === Internal helpers ===

    /// Caller must hold `write_lock`
    fn publish(&self, next: Trie, key_len: usize) {
        let superseded = {
            let mut published = self.root.lock();
            published.version += 1;
            debug!(version = published.version, key_len, "published new version");
            std::mem::replace(&mut published.trie, next)
        };
        // The old root may be the last reference to its nodes; free them
        // outside the publish lock.
        drop(superseded);
    }
}
