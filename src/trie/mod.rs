//! Persistent copy-on-write trie
//!
//! This implements an immutable prefix tree where:
//! - Every update returns a new [`Trie`] and leaves the old one untouched
//! - Only the nodes on the updated key's path are copied
//! - Unchanged subtrees are shared between versions through `Arc`

mod node;
mod tree;
mod value;

pub use node::TrieNode;
pub use tree::Trie;
pub use value::TaggedValue;
