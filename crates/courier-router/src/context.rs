//! Per-invocation context shared between a rule's interceptors and handlers.
//!
//! A fresh [`RuleContext`] is created every time a rule's pipeline runs and
//! is dropped when the pipeline returns. It is the only channel through which
//! an interceptor can hand derived data (a loaded user profile, a parsed
//! command) to the handlers behind it. Nothing stored here is visible to
//! other rules or to other messages.
//!
//! ```rust,ignore
//! // in an interceptor
//! ctx.insert("user", profile);
//!
//! // in a handler further down the same rule
//! let profile = ctx.get::<Profile>("user");
//! ```

use std::any::Any;
use std::collections::HashMap;

/// String-keyed, type-erased storage scoped to one pipeline invocation.
///
/// Values are looked up by key *and* type: a lookup with the wrong type
/// returns `None` and leaves the stored value in place.
#[derive(Default)]
pub struct RuleContext {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl RuleContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing whatever was stored under `key`.
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Borrows the value stored under `key` if it has type `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Mutably borrows the value stored under `key` if it has type `T`.
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Removes and returns the value under `key` if it has type `T`.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key).is_some_and(|v| v.is::<T>()) {
            return None;
        }
        self.values
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Returns `true` if anything is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for RuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_typed() {
        let mut ctx = RuleContext::new();
        ctx.insert("count", 3_u32);

        assert_eq!(ctx.get::<u32>("count"), Some(&3));
        assert_eq!(ctx.get::<String>("count"), None);
        assert!(ctx.contains_key("count"));
    }

    #[test]
    fn insert_overwrites() {
        let mut ctx = RuleContext::new();
        ctx.insert("name", "first".to_string());
        ctx.insert("name", "second".to_string());

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get::<String>("name").map(String::as_str), Some("second"));
    }

    #[test]
    fn remove_with_wrong_type_keeps_value() {
        let mut ctx = RuleContext::new();
        ctx.insert("id", 7_i64);

        assert_eq!(ctx.remove::<u8>("id"), None);
        assert!(ctx.contains_key("id"));
        assert_eq!(ctx.remove::<i64>("id"), Some(7));
        assert!(ctx.is_empty());
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut ctx = RuleContext::new();
        ctx.insert("hits", vec![1]);
        ctx.get_mut::<Vec<i32>>("hits").unwrap().push(2);

        assert_eq!(ctx.get::<Vec<i32>>("hits"), Some(&vec![1, 2]));
    }
}
