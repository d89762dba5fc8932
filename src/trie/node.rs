//! Trie node types

use super::TaggedValue;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A node in the persistent trie
///
/// Nodes are immutable once they are wrapped in an `Arc` and reachable from a
/// [`Trie`](super::Trie). Updates build new nodes along the key's path and
/// share every other child with the previous version.
#[derive(Clone, Default)]
pub struct TrieNode {
    /// Children indexed by the next key byte
    pub(crate) children: BTreeMap<u8, Arc<TrieNode>>,
    /// Value for the key that ends exactly at this node
    pub(crate) value: Option<TaggedValue>,
}

impl TrieNode {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        TrieNode::default()
    }

    #[cfg(test)]
    pub(crate) fn leaf(value: TaggedValue) -> Self {
        TrieNode {
            children: BTreeMap::new(),
            value: Some(value),
        }
    }

    /// Look up the child for a key byte
    pub fn child(&self, byte: u8) -> Option<&Arc<TrieNode>> {
        self.children.get(&byte)
    }

    /// Iterate children in key byte order
    pub fn children(&self) -> impl Iterator<Item = (u8, &Arc<TrieNode>)> {
        self.children.iter().map(|(byte, child)| (*byte, child))
    }

    /// Get the value at this exact node (if any)
    pub fn value(&self) -> Option<&TaggedValue> {
        self.value.as_ref()
    }

    /// Whether this node holds a value
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// A node with neither value nor children anchors no key and can be pruned
    pub fn is_prunable(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

/// Shows child bytes rather than child nodes, so formatting a deep trie
/// does not descend into it.
impl fmt::Debug for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieNode")
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("value", &self.value)
            .finish()
    }
}

// The default drop recurses once per level, and a single long key builds a
// chain as deep as the key. Unlink descendants through a work list instead.
impl Drop for TrieNode {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }

        let mut pending: Vec<Arc<TrieNode>> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(child) = pending.pop() {
            // Nodes still shared with another version are left to their other owners
            if let Ok(mut node) = Arc::try_unwrap(child) {
                pending.extend(std::mem::take(&mut node.children).into_values());
            }
        }
    }
}
