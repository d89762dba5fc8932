//! Concurrent key-value store
//!
//! This module wraps the persistent trie with the locking that lets many
//! readers take snapshots while writers publish new versions one at a time.

mod guard;
mod trie_store;

pub use guard::ValueGuard;
pub use trie_store::TrieStore;
