//! Read guard that keeps a trie version alive

use crate::trie::Trie;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A value read from a [`TrieStore`](super::TrieStore)
///
/// The guard co-owns the snapshot the value was found in, so the value stays
/// valid no matter what the store publishes afterwards. Dropping the last
/// guard on a superseded version releases that version's nodes.
pub struct ValueGuard<T> {
    _snapshot: Trie,
    value: Arc<T>,
}

impl<T> ValueGuard<T> {
    pub(crate) fn new(snapshot: Trie, value: Arc<T>) -> Self {
        ValueGuard {
            _snapshot: snapshot,
            value,
        }
    }
}

impl<T> Deref for ValueGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueGuard").field(&*self.value).finish()
    }
}

impl<T: fmt::Display> fmt::Display for ValueGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.value, f)
    }
}
