//! Late-bound lookup between classes and their output types.
//!
//! `node` and array fields are created before every class has been loaded,
//! so their resolvers hold a [`ClassIndex`] handle that the build fills in
//! once the per-class loaders are done. Until then every lookup misses.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Default)]
struct Entries {
    type_by_class: HashMap<String, String>,
    class_by_type: HashMap<String, String>,
}

/// Shared class <-> output type map.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex(Arc<OnceLock<Entries>>);

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the index from `(class name, output type)` pairs.
    ///
    /// The first class claiming a type keeps it. Returns the classes that
    /// lost, with the class that holds their type. Only the first call has
    /// an effect.
    pub fn publish<'a>(
        &self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Vec<(String, String)> {
        let mut index = Entries::default();
        let mut shadowed = Vec::new();
        for (class_name, type_name) in entries {
            if let Some(owner) = index.class_by_type.get(type_name) {
                shadowed.push((class_name.to_string(), owner.clone()));
                continue;
            }
            index.class_by_type.insert(type_name.to_string(), class_name.to_string());
            index.type_by_class.insert(class_name.to_string(), type_name.to_string());
        }
        let _ = self.0.set(index);
        shadowed
    }

    pub fn is_published(&self) -> bool {
        self.0.get().is_some()
    }

    /// The output type of `class_name`, if it has one.
    pub fn type_for_class(&self, class_name: &str) -> Option<&str> {
        self.0.get()?.type_by_class.get(class_name).map(String::as_str)
    }

    /// The class behind the output type `type_name`.
    pub fn class_for_type(&self, type_name: &str) -> Option<&str> {
        self.0.get()?.class_by_type.get(type_name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_miss_until_published() {
        let index = ClassIndex::new();
        let handle = index.clone();
        assert_eq!(handle.type_for_class("Car"), None);

        index.publish([("Car", "Car")]);
        assert!(handle.is_published());
        assert_eq!(handle.type_for_class("Car"), Some("Car"));
        assert_eq!(handle.class_for_type("Car"), Some("Car"));
    }

    #[test]
    fn test_first_class_keeps_a_shared_type() {
        let index = ClassIndex::new();
        let shadowed = index.publish([("_Foo", "Foo"), ("Foo", "Foo")]);

        assert_eq!(shadowed, vec![("Foo".to_string(), "_Foo".to_string())]);
        assert_eq!(index.class_for_type("Foo"), Some("_Foo"));
        assert_eq!(index.type_for_class("Foo"), None);
    }

    #[test]
    fn test_second_publish_is_ignored() {
        let index = ClassIndex::new();
        index.publish([("Car", "Car")]);
        index.publish([("Boat", "Boat")]);
        assert_eq!(index.type_for_class("Boat"), None);
    }
}
