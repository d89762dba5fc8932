//! Type-tagged values stored in trie nodes

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased value with a runtime type tag
///
/// The tag is checked before any downcast, so a lookup with the wrong type
/// simply finds nothing. The body is shared, which makes copying a node
/// during path copying cheap regardless of the payload size.
#[derive(Clone)]
pub struct TaggedValue {
    tag: TypeId,
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl TaggedValue {
    /// Wrap a value, recording its type
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        TaggedValue {
            tag: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Check whether the stored value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.tag == TypeId::of::<T>()
    }

    /// Borrow the value as a `T`, if that is what was stored
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        self.inner.downcast_ref::<T>()
    }

    /// Take a shared handle to the value as a `T`
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        if !self.is::<T>() {
            return None;
        }
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Name of the stored type, for display only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_type_downcasts() {
        let value = TaggedValue::new(42i64);
        assert!(value.is::<i64>());
        assert_eq!(value.downcast_ref::<i64>(), Some(&42));
        assert_eq!(value.downcast_arc::<i64>().as_deref(), Some(&42));
    }

    #[test]
    fn test_mismatched_type_is_absent() {
        let value = TaggedValue::new(42i64);
        assert!(!value.is::<i32>());
        assert!(value.downcast_ref::<String>().is_none());
        assert!(value.downcast_arc::<u64>().is_none());
    }

    #[test]
    fn test_clone_shares_body() {
        let value = TaggedValue::new(String::from("shared"));
        let copy = value.clone();
        let a = value.downcast_ref::<String>().unwrap();
        let b = copy.downcast_ref::<String>().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(copy.type_name().ends_with("String"));
    }
}
