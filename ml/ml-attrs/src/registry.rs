//! Tagged typed serialization and the kind registry.
//!
//! A "kind" is a named record type that round-trips through [`AttrMap`]
//! payloads carrying a `_kind` discriminator. Decoding a payload whose tag
//! is not registered falls back to the plain untyped map, with a warning,
//! so configs written by newer code still load.

use std::any::Any;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AttrError, Result};
use crate::map::AttrMap;
use crate::value::AttrValue;

/// Key under which the kind discriminator is stored.
pub const KIND_KEY: &str = "_kind";

/// A record type that round-trips through tagged [`AttrMap`] payloads.
///
/// # Example
///
/// ```
/// use ml_attrs::{AttrKind, decode_tagged, encode_tagged};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct OptimConfig {
///     lr: f64,
/// }
///
/// impl AttrKind for OptimConfig {
///     const KIND: &'static str = "optim_config";
/// }
///
/// let map = encode_tagged(&OptimConfig { lr: 0.1 }).unwrap();
/// assert_eq!(map.get("_kind").unwrap().as_str(), Some("optim_config"));
///
/// let back: OptimConfig = decode_tagged(&map).unwrap();
/// assert_eq!(back, OptimConfig { lr: 0.1 });
/// ```
pub trait AttrKind: Serialize + DeserializeOwned {
    /// The kind name written into the `_kind` field.
    const KIND: &'static str;
}

/// Encodes a typed value into a tagged attribute map.
///
/// # Errors
///
/// Returns an error if the value does not serialize to an object.
pub fn encode_tagged<T: AttrKind>(value: &T) -> Result<AttrMap> {
    let json = serde_json::to_value(value)?;
    let AttrValue::Map(payload) = AttrValue::from_json_value(json) else {
        return Err(AttrError::not_an_object(T::KIND));
    };
    let mut tagged = AttrMap::new();
    tagged.insert(KIND_KEY, T::KIND);
    for (key, value) in &payload {
        tagged.insert(key.clone(), value.clone());
    }
    Ok(tagged)
}

/// Decodes a typed value from a tagged attribute map.
///
/// # Errors
///
/// Returns an error if the tag names a different kind or the payload does
/// not deserialize into `T`.
pub fn decode_tagged<T: AttrKind>(map: &AttrMap) -> Result<T> {
    let found = map
        .get(KIND_KEY)
        .and_then(AttrValue::as_str)
        .unwrap_or_default();
    if found != T::KIND {
        return Err(AttrError::kind_mismatch(T::KIND, found));
    }

    let mut payload = map.clone();
    payload.remove(KIND_KEY);
    serde_json::from_value(payload.jsonify()).map_err(AttrError::from)
}

/// Outcome of a registry decode.
pub enum Decoded {
    /// The tag named a registered kind and decoded successfully.
    Typed {
        /// The kind name.
        kind: String,
        /// The decoded value.
        value: Box<dyn Any + Send>,
    },

    /// The payload was untagged or named an unknown kind.
    Untyped(AttrMap),
}

impl Decoded {
    /// Extracts the typed value, if it is of type `T`.
    #[must_use]
    pub fn downcast<T: Any>(self) -> Option<T> {
        match self {
            Self::Typed { value, .. } => value.downcast::<T>().ok().map(|b| *b),
            Self::Untyped(_) => None,
        }
    }

    /// Returns the kind name, if typed.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Typed { kind, .. } => Some(kind),
            Self::Untyped(_) => None,
        }
    }
}

impl std::fmt::Debug for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Typed { kind, .. } => f.debug_struct("Typed").field("kind", kind).finish(),
            Self::Untyped(map) => f.debug_tuple("Untyped").field(map).finish(),
        }
    }
}

type DecodeFn = fn(&AttrMap) -> Result<Box<dyn Any + Send>>;

/// Registry of known kinds.
///
/// # Example
///
/// ```
/// use ml_attrs::{AttrKind, AttrRegistry, encode_tagged};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct RunMeta {
///     name: String,
/// }
///
/// impl AttrKind for RunMeta {
///     const KIND: &'static str = "run_meta";
/// }
///
/// let mut registry = AttrRegistry::new();
/// registry.register::<RunMeta>();
///
/// let map = encode_tagged(&RunMeta { name: "exp1".into() }).unwrap();
/// let decoded = registry.decode(map).unwrap();
/// let meta: RunMeta = decoded.downcast().unwrap();
/// assert_eq!(meta.name, "exp1");
/// ```
#[derive(Debug, Default)]
pub struct AttrRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl AttrRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind. Re-registering the same kind replaces the decoder.
    pub fn register<T: AttrKind + Any + Send>(&mut self) {
        self.decoders.insert(T::KIND, |map| {
            decode_tagged::<T>(map).map(|v| Box::new(v) as Box<dyn Any + Send>)
        });
    }

    /// Returns `true` if the kind name is registered.
    #[must_use]
    pub fn knows(&self, kind: &str) -> bool {
        self.decoders.contains_key(kind)
    }

    /// Decodes a tagged payload.
    ///
    /// An untagged payload, or a tag naming an unregistered kind, falls
    /// back to [`Decoded::Untyped`] with the tag stripped; unknown kinds
    /// additionally log a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only when a *registered* kind fails to decode.
    pub fn decode(&self, mut map: AttrMap) -> Result<Decoded> {
        let Some(kind) = map.get(KIND_KEY).and_then(AttrValue::as_str) else {
            return Ok(Decoded::Untyped(map));
        };
        let kind = kind.to_string();

        match self.decoders.get(kind.as_str()) {
            Some(decode) => {
                let value = decode(&map)?;
                Ok(Decoded::Typed { kind, value })
            }
            None => {
                warn!(kind = %kind, "unknown attribute kind, falling back to untyped map");
                map.remove(KIND_KEY);
                Ok(Decoded::Untyped(map))
            }
        }
    }
}
