//! Insertion-ordered attribute maps with dotted-path addressing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AttrError, Result};
use crate::value::AttrValue;

/// An insertion-ordered `String -> AttrValue` map.
///
/// Keys written with dotted paths address nested maps: `set("a.b", v)`
/// creates the intermediate map `a` on demand and stores `v` under `b`.
/// Iteration, `walk`, and serialization all preserve insertion order.
///
/// # Example
///
/// ```
/// use ml_attrs::{AttrMap, AttrValue};
///
/// let mut m = AttrMap::new();
/// m.set("optim.lr", 1e-3).unwrap();
/// m.set("optim.momentum", 0.9).unwrap();
/// m.set("epochs", 100).unwrap();
///
/// assert_eq!(m.get("optim.lr"), Some(&AttrValue::Float(1e-3)));
/// assert!(m.contains("optim.momentum"));
/// assert_eq!(m.len(), 2); // "optim" and "epochs"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrMap {
    entries: IndexMap<String, AttrValue>,
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(AttrError::empty_segment(path));
    }
    Ok(segments)
}

impl AttrMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a value under a literal (non-dotted) key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Sets a value at a dotted path.
    ///
    /// Missing or `Null` intermediates become maps. A non-map intermediate
    /// is an error; the *final* segment may overwrite anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has an empty segment or traverses a
    /// non-map value.
    pub fn set(&mut self, path: &str, value: impl Into<AttrValue>) -> Result<()> {
        let segments = split_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| AttrError::empty_segment(path))?;

        let mut cur = self;
        for seg in parents {
            let slot = cur
                .entries
                .entry((*seg).to_string())
                .or_insert_with(|| AttrValue::Map(Self::new()));
            if slot.is_null() {
                *slot = AttrValue::Map(Self::new());
            }
            cur = match slot {
                AttrValue::Map(map) => map,
                _ => return Err(AttrError::not_a_map(path, *seg)),
            };
        }
        cur.entries.insert((*last).to_string(), value.into());
        Ok(())
    }

    /// Gets a value at a dotted path.
    ///
    /// Returns `None` for missing paths or paths through non-map values.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&AttrValue> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut cur = self;
        for seg in parents {
            cur = cur.entries.get(*seg)?.as_map()?;
        }
        cur.entries.get(*last)
    }

    /// Gets a mutable value at a dotted path.
    #[must_use]
    pub fn get_mut(&mut self, path: &str) -> Option<&mut AttrValue> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut cur = self;
        for seg in parents {
            cur = cur.entries.get_mut(*seg)?.as_map_mut()?;
        }
        cur.entries.get_mut(*last)
    }

    /// Returns `true` if a value exists at the dotted path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Removes and returns the value at a dotted path.
    ///
    /// Removal preserves the order of the remaining entries. Empty
    /// intermediate maps are left in place.
    pub fn remove(&mut self, path: &str) -> Option<AttrValue> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut cur = self;
        for seg in parents {
            cur = cur.entries.get_mut(*seg)?.as_map_mut()?;
        }
        cur.entries.shift_remove(*last)
    }

    /// Iterates over the top-level entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Walks every leaf value depth-first, yielding `(dotted_path, value)`.
    ///
    /// Nested maps are flattened; an empty nested map yields nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use ml_attrs::AttrMap;
    ///
    /// let mut m = AttrMap::new();
    /// m.set("a", 1).unwrap();
    /// m.set("b.c", 2).unwrap();
    ///
    /// let paths: Vec<String> = m.walk().map(|(p, _)| p).collect();
    /// assert_eq!(paths, vec!["a", "b.c"]);
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = (String, &AttrValue)> {
        let mut leaves = Vec::new();
        self.collect_leaves(None, &mut leaves);
        leaves.into_iter()
    }

    fn collect_leaves<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a AttrValue)>) {
        for (key, value) in &self.entries {
            let path = match prefix {
                Some(p) => format!("{p}.{key}"),
                None => key.clone(),
            };
            match value {
                AttrValue::Map(inner) => inner.collect_leaves(Some(&path), out),
                leaf => out.push((path, leaf)),
            }
        }
    }

    /// Bulk-updates the map from `(path, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns the first path error encountered.
    pub fn replace<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttrValue>,
    {
        for (path, value) in pairs {
            self.set(path.as_ref(), value)?;
        }
        Ok(())
    }

    /// Converts the map to a `serde_json::Value`, preserving order.
    #[must_use]
    pub fn jsonify(&self) -> Value {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.entries {
            obj.insert(key.clone(), value.to_json_value());
        }
        Value::Object(obj)
    }

    /// Serializes the map to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(AttrError::from)
    }

    /// Deserializes a map from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(AttrError::from)
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'a> IntoIterator for &'a AttrMap {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for AttrMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jsonify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_set_get_round_trip() {
        let mut m = AttrMap::new();
        m.set("a.b.c", 42).unwrap();
        assert_eq!(m.get("a.b.c"), Some(&AttrValue::Int(42)));
        assert!(m.get("a.b").unwrap().as_map().is_some());
        assert!(m.get("a.b.missing").is_none());
    }

    #[test]
    fn map_set_through_non_map_fails() {
        let mut m = AttrMap::new();
        m.set("a", 1).unwrap();
        let err = m.set("a.b", 2).unwrap_err();
        assert!(matches!(err, AttrError::NotAMap { .. }));
    }

    #[test]
    fn map_set_overwrites_null_intermediate() {
        let mut m = AttrMap::new();
        m.insert("a", AttrValue::Null);
        m.set("a.b", 1).unwrap();
        assert_eq!(m.get("a.b"), Some(&AttrValue::Int(1)));
    }

    #[test]
    fn map_final_segment_may_overwrite_anything() {
        let mut m = AttrMap::new();
        m.set("a.b", 1).unwrap();
        m.set("a", 2).unwrap();
        assert_eq!(m.get("a"), Some(&AttrValue::Int(2)));
        assert!(m.get("a.b").is_none());
    }

    #[test]
    fn map_empty_segment_is_error() {
        let mut m = AttrMap::new();
        assert!(m.set("a..b", 1).is_err());
        assert!(m.set(".a", 1).is_err());
        assert!(m.get("a..b").is_none());
    }

    #[test]
    fn map_contains() {
        let mut m = AttrMap::new();
        m.set("x.y", 1).unwrap();
        assert!(m.contains("x.y"));
        assert!(m.contains("x"));
        assert!(!m.contains("x.z"));
    }

    #[test]
    fn map_remove() {
        let mut m = AttrMap::new();
        m.set("a", 1).unwrap();
        m.set("b.c", 2).unwrap();
        m.set("d", 3).unwrap();

        assert_eq!(m.remove("b.c"), Some(AttrValue::Int(2)));
        assert!(m.remove("b.c").is_none());

        // Remaining order preserved
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["a", "b", "d"]);
    }

    #[test]
    fn map_get_mut() {
        let mut m = AttrMap::new();
        m.set("a.b", 1).unwrap();
        *m.get_mut("a.b").unwrap() = AttrValue::from("changed");
        assert_eq!(m.get("a.b").unwrap().as_str(), Some("changed"));
    }

    #[test]
    fn map_preserves_insertion_order() {
        let mut m = AttrMap::new();
        m.set("zebra", 1).unwrap();
        m.set("alpha", 2).unwrap();
        m.set("mid", 3).unwrap();

        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
    }

    #[test]
    fn map_walk_flattens_in_order() {
        let mut m = AttrMap::new();
        m.set("a", 1).unwrap();
        m.set("b.x", 2).unwrap();
        m.set("b.y.z", 3).unwrap();
        m.set("c", 4).unwrap();

        let paths: Vec<String> = m.walk().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a", "b.x", "b.y.z", "c"]);
    }

    #[test]
    fn map_walk_skips_empty_nested_maps() {
        let mut m = AttrMap::new();
        m.insert("empty", AttrMap::new());
        m.set("a", 1).unwrap();

        let paths: Vec<String> = m.walk().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a"]);
    }

    #[test]
    fn map_replace() {
        let mut m = AttrMap::new();
        m.replace([("lr", 0.1), ("optim.eps", 1e-8)]).unwrap();
        assert_eq!(m.get("lr"), Some(&AttrValue::Float(0.1)));
        assert!(m.contains("optim.eps"));
    }

    #[test]
    fn map_json_round_trip_preserves_order() {
        let mut m = AttrMap::new();
        m.set("z", 1).unwrap();
        m.set("a.b", 2).unwrap();
        m.set("m", "text").unwrap();

        let json = m.to_json().unwrap();
        let back = AttrMap::from_json(&json).unwrap();
        assert_eq!(back, m);

        let keys: Vec<&str> = back.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn map_jsonify() {
        let mut m = AttrMap::new();
        m.set("a.b", 1).unwrap();
        let value = m.jsonify();
        assert_eq!(value["a"]["b"], 1);
    }

    #[test]
    fn map_from_iterator() {
        let m: AttrMap = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("b"), Some(&AttrValue::Int(2)));
    }

    #[test]
    fn map_from_json_rejects_non_object() {
        assert!(AttrMap::from_json("[1, 2]").is_err());
    }
}
