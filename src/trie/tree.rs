//! Persistent trie handle with path-copying updates

use super::{TaggedValue, TrieNode};
use std::any::Any;
use std::sync::Arc;

/// A versioned, immutable handle to a trie
///
/// Cloning a `Trie` is O(1): it bumps the reference count of the root. Every
/// node reachable from the root stays alive for as long as the handle does,
/// so an old version remains readable after newer versions are built from it.
///
/// `put` and `remove` never modify `self`; they return a new handle that
/// shares every subtree off the updated key's path.
#[derive(Clone, Debug, Default)]
pub struct Trie {
    /// Root node, `None` for a trie with no entries
    root: Option<Arc<TrieNode>>,
}

impl Trie {
    /// Create a new empty trie
    pub fn new() -> Self {
        Trie { root: None }
    }

    /// Get the root node, if any
    pub fn root(&self) -> Option<&Arc<TrieNode>> {
        self.root.as_ref()
    }

    /// Get a value by key
    ///
    /// Returns `None` if the key is absent, and also if the stored value is
    /// not a `T`. Treating a type mismatch as absence keeps lookups total, at
    /// the cost of hiding the difference from the caller.
    pub fn get<T: Any>(&self, key: impl AsRef<[u8]>) -> Option<&T> {
        self.get_value(key)?.downcast_ref::<T>()
    }

    /// Get the type-tagged value stored at a key
    pub fn get_value(&self, key: impl AsRef<[u8]>) -> Option<&TaggedValue> {
        self.find_node(key.as_ref())?.value()
    }

    /// Check whether any value is stored at a key
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get_value(key).is_some()
    }

    /// Return a new trie with `value` stored at `key`
    ///
    /// Any previous value at `key` is replaced in the new version only.
    pub fn put<T: Any + Send + Sync>(&self, key: impl AsRef<[u8]>, value: T) -> Trie {
        let key = key.as_ref();
        let path = self.existing_path(key);

        // Copy the terminal node (or start a bare one) and attach the value
        let mut terminal = path[key.len()].map(|n| TrieNode::clone(n)).unwrap_or_default();
        terminal.value = Some(TaggedValue::new(value));

        // Copy each ancestor bottom-up, pointing it at the freshly built child
        let mut built = Arc::new(terminal);
        for (depth, byte) in key.iter().enumerate().rev() {
            let mut copy = path[depth].map(|n| TrieNode::clone(n)).unwrap_or_default();
            copy.children.insert(*byte, built);
            built = Arc::new(copy);
        }

        Trie { root: Some(built) }
    }

    /// Return a new trie without the value at `key`
    ///
    /// Nodes left with neither a value nor children are pruned. If the key is
    /// absent, the returned handle shares the existing root.
    pub fn remove(&self, key: impl AsRef<[u8]>) -> Trie {
        let key = key.as_ref();
        let Some(root) = self.root.as_ref() else {
            return Trie::new();
        };

        let mut path = Vec::with_capacity(key.len() + 1);
        path.push(root);
        let mut node = root;
        for byte in key {
            match node.child(*byte) {
                Some(child) => {
                    path.push(child);
                    node = child;
                }
                None => return self.clone(),
            }
        }

        let terminal = path[key.len()];
        if !terminal.has_value() {
            return self.clone();
        }

        let mut built = Self::unless_prunable(TrieNode {
            children: terminal.children.clone(),
            value: None,
        });
        for (depth, byte) in key.iter().enumerate().rev() {
            let parent = path[depth];
            let mut children = parent.children.clone();
            match built {
                Some(child) => {
                    children.insert(*byte, child);
                }
                None => {
                    children.remove(byte);
                }
            }
            built = Self::unless_prunable(TrieNode {
                children,
                value: parent.value.clone(),
            });
        }

        Trie { root: built }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.root.as_deref().map_or(0, Self::count_values)
    }

    /// Whether the trie holds no values
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// List all entries whose key starts with `prefix`, in key order
    pub fn list_prefix(&self, prefix: impl AsRef<[u8]>) -> Vec<(Vec<u8>, &TaggedValue)> {
        let prefix = prefix.as_ref();
        let mut results = Vec::new();
        if let Some(node) = self.find_node(prefix) {
            Self::collect_prefix(node, prefix, &mut results);
        }
        results
    }

    /// Check whether two handles point at the same root
    pub fn ptr_eq(a: &Trie, b: &Trie) -> bool {
        match (&a.root, &b.root) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            (None, None) => true,
            _ => false,
        }
    }

    // === Internal helpers ===

    fn find_node(&self, key: &[u8]) -> Option<&TrieNode> {
        let mut node = self.root.as_deref()?;
        for byte in key {
            node = &**node.child(*byte)?;
        }
        Some(node)
    }

    /// Existing nodes along `key`, starting at the root; `None` past the
    /// point where the path leaves the trie.
    fn existing_path(&self, key: &[u8]) -> Vec<Option<&Arc<TrieNode>>> {
        let mut path = Vec::with_capacity(key.len() + 1);
        let mut current = self.root.as_ref();
        path.push(current);
        for byte in key {
            current = current.and_then(|node| node.child(*byte));
            path.push(current);
        }
        path
    }

    fn unless_prunable(node: TrieNode) -> Option<Arc<TrieNode>> {
        if node.is_prunable() {
            None
        } else {
            Some(Arc::new(node))
        }
    }

    fn count_values(root: &TrieNode) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            count += usize::from(node.has_value());
            stack.extend(node.children().map(|(_, child)| &**child));
        }
        count
    }

    /// Depth-first walk in key order. One key buffer is shared by the whole
    /// walk; each stack entry records the buffer length to restore.
    fn collect_prefix<'t>(
        start: &'t TrieNode,
        prefix: &[u8],
        results: &mut Vec<(Vec<u8>, &'t TaggedValue)>,
    ) {
        let mut key = prefix.to_vec();
        let mut stack: Vec<(usize, Option<u8>, &'t TrieNode)> = vec![(key.len(), None, start)];

        while let Some((len, byte, node)) = stack.pop() {
            key.truncate(len);
            key.extend(byte);

            if let Some(value) = node.value() {
                results.push((key.clone(), value));
            }

            // Pushed in reverse so the smallest byte is popped first
            for (child_byte, child) in node.children.iter().rev() {
                stack.push((key.len(), Some(*child_byte), &**child));
            }
        }
    }
}
