//! Attribute values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::map::AttrMap;

/// A single attribute value.
///
/// Values model the JSON data space plus insertion-ordered nested maps.
/// Serialization is untagged, so a value round-trips to the JSON you
/// would expect (`Int(3)` is `3`, `Map` is an object, and so on).
///
/// # Example
///
/// ```
/// use ml_attrs::AttrValue;
///
/// let v = AttrValue::from(42);
/// assert_eq!(v.as_int(), Some(42));
/// assert!(v.as_str().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Absent/placeholder value.
    #[default]
    Null,

    /// Boolean.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Floating-point number.
    Float(f64),

    /// String.
    Str(String),

    /// Ordered list of values.
    List(Vec<AttrValue>),

    /// Nested ordered map.
    Map(AttrMap),
}

impl AttrValue {
    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float payload; integers widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested map, if any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the nested map mutably, if any.
    #[must_use]
    pub fn as_map_mut(&mut self) -> Option<&mut AttrMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns a short name for the value's type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Converts a `serde_json::Value` into an attribute value.
    #[must_use]
    pub fn from_json_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_i64().map_or_else(
                || Self::Float(n.as_f64().unwrap_or(0.0)),
                Self::Int,
            ),
            Value::String(s) => Self::Str(s),
            Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json_value).collect())
            }
            Value::Object(entries) => {
                let mut map = AttrMap::new();
                for (k, v) in entries {
                    map.insert(k, Self::from_json_value(v));
                }
                Self::Map(map)
            }
        }
    }

    /// Converts the value into a `serde_json::Value`.
    ///
    /// Non-finite floats become `null`, which is what JSON can express.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json_value).collect()),
            Self::Map(map) => map.jsonify(),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<AttrMap> for AttrValue {
    fn from(map: AttrMap) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_default_is_null() {
        assert!(AttrValue::default().is_null());
    }

    #[test]
    fn value_accessors() {
        assert_eq!(AttrValue::from(true).as_bool(), Some(true));
        assert_eq!(AttrValue::from(7).as_int(), Some(7));
        assert_eq!(AttrValue::from(1.5).as_float(), Some(1.5));
        assert_eq!(AttrValue::from("hi").as_str(), Some("hi"));
        assert!(AttrValue::from(7).as_str().is_none());
    }

    #[test]
    fn value_int_widens_to_float() {
        assert_eq!(AttrValue::from(3).as_float(), Some(3.0));
    }

    #[test]
    fn value_list_conversion() {
        let v = AttrValue::from(vec![1, 2, 3]);
        let items = v.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_int(), Some(1));
    }

    #[test]
    fn value_type_name() {
        assert_eq!(AttrValue::Null.type_name(), "null");
        assert_eq!(AttrValue::from(1).type_name(), "int");
        assert_eq!(AttrValue::from("x").type_name(), "str");
    }

    #[test]
    fn value_untagged_serialization() {
        let json = serde_json::to_string(&AttrValue::from(3)).unwrap();
        assert_eq!(json, "3");

        let back: AttrValue = serde_json::from_str("3").unwrap();
        assert_eq!(back, AttrValue::Int(3));

        let back: AttrValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(back, AttrValue::Float(3.5));

        let back: AttrValue = serde_json::from_str("null").unwrap();
        assert!(back.is_null());
    }

    #[test]
    fn value_json_value_round_trip() {
        let v = AttrValue::from(vec![
            AttrValue::from(1),
            AttrValue::from("two"),
            AttrValue::Null,
        ]);
        let json = v.to_json_value();
        assert_eq!(AttrValue::from_json_value(json), v);
    }

    #[test]
    fn value_non_finite_float_becomes_null() {
        let v = AttrValue::from(f64::NAN);
        assert_eq!(v.to_json_value(), Value::Null);
    }
}
