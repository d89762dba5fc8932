//! # cow_trie
//!
//! A concurrent key-value store built on a persistent copy-on-write trie.
//!
//! Readers take a cheap snapshot of the current version and walk it without
//! holding any lock. Writers are serialized, build the next version by copying
//! only the nodes on the key's path, and publish it atomically. A value read
//! from the store stays valid for as long as the caller holds it, whatever is
//! written afterwards.
//!
//! ## Core Concepts
//!
//! - **Trie**: an immutable, versioned handle; `put`/`remove` return new versions
//! - **TrieStore**: the single current version plus the locks that publish it
//! - **ValueGuard**: a read result that keeps its version alive
//!
//! ## Example
//!
//! ```
//! use cow_trie::TrieStore;
//!
//! let store = TrieStore::new();
//! store.put("a", 1i64);
//! let guard = store.get::<i64>("a").unwrap();
//! store.put("a", 2i64);
//! assert_eq!(*guard, 1);
//! assert_eq!(*store.get::<i64>("a").unwrap(), 2);
//!
//! // A value of another type reads as absent
//! assert!(store.get::<String>("a").is_none());
//! ```

pub mod shell;
pub mod store;
pub mod stress;
pub mod trie;

mod error;

pub use error::{Error, Result};
pub use shell::{Command, Output, Record, Shell};
pub use store::{TrieStore, ValueGuard};
pub use stress::{StressConfig, StressReport};
pub use trie::{TaggedValue, Trie, TrieNode};
