//! Records: ordered tag name to value maps.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::value::{Ref, Value};

/// A record of tags.
///
/// Tag order is by name so records compare and print deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    tags: BTreeMap<String, Value>,
}

impl Dict {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a single tag.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.tags.get(name)
    }

    /// Returns true if the tag is present.
    pub fn has(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Inserts or replaces a tag, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.tags.insert(name.into(), value.into())
    }

    /// Builder-style variant of [`Dict::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the record's `id` ref, if it has one.
    pub fn id(&self) -> Option<&Ref> {
        self.get("id").and_then(Value::as_reference)
    }

    /// Iterates tag names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Iterates tags in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Builds a [`Dict`] from `name => value` pairs.
///
/// ```
/// use haystack_model_rs::prelude::*;
///
/// let ahu = dict! { "id" => Ref::new("ahu"), "ahu" => Value::Marker };
/// assert_eq!(ahu.len(), 2);
/// ```
#[macro_export]
macro_rules! dict {
    () => {
        $crate::dict::Dict::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::dict::Dict::new();
        $(
            record.insert($name, $crate::value::Value::from($value));
        )+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn test_dict_get_and_has() {
        let record = Dict::new().with("site", Value::Marker).with("area", 100);
        assert!(record.has("site"));
        assert!(!record.has("equip"));
        assert_eq!(record.get("area"), Some(&Value::Number(Number::new(100.0))));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_dict_id() {
        let record = crate::dict! { "id" => Ref::new("a"), "dis" => "A" };
        assert_eq!(record.id(), Some(&Ref::new("a")));
        assert_eq!(Dict::new().id(), None);
    }

    #[test]
    fn test_dict_keys_are_ordered() {
        let record = crate::dict! { "zeta" => Value::Marker, "alpha" => Value::Marker };
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_dict_from_iter() {
        let record: Dict = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(record.len(), 2);
    }
}
