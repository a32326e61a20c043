//! Ordered attribute maps for ML experiment workflows.
//!
//! This crate provides the value layer used to describe experiment
//! parameters and composed samples:
//!
//! # Attribute Maps
//!
//! - [`AttrMap`] - Insertion-ordered map with dotted-path addressing
//! - [`AttrValue`] - The value space (null/bool/int/float/str/list/map)
//!
//! # Tagged Typed Serialization
//!
//! - [`AttrKind`] - Record types tagged with a `_kind` discriminator
//! - [`encode_tagged`] / [`decode_tagged`] - Typed round-trips
//! - [`AttrRegistry`] - Open registry of known kinds with an untyped
//!   fallback for unknown tags
//!
//! # Layer 0 Crate
//!
//! This crate has no ML-framework dependencies. It can be used in:
//! - Experiment configuration records
//! - Dataset sample descriptors
//! - Result logging and serialization
//!
//! # Example
//!
//! ```
//! use ml_attrs::{AttrMap, AttrValue};
//!
//! let mut params = AttrMap::new();
//! params.set("optim.lr", 1e-3).unwrap();
//! params.set("optim.weight_decay", 5e-4).unwrap();
//! params.set("epochs", 200).unwrap();
//!
//! assert_eq!(params.get("optim.lr"), Some(&AttrValue::Float(1e-3)));
//!
//! let flat: Vec<String> = params.walk().map(|(path, _)| path).collect();
//! assert_eq!(flat, vec!["optim.lr", "optim.weight_decay", "epochs"]);
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod map;
mod registry;
mod value;

// Re-export map types
pub use map::AttrMap;
pub use value::AttrValue;

// Re-export tagged serialization
pub use registry::{AttrKind, AttrRegistry, Decoded, KIND_KEY, decode_tagged, encode_tagged};

// Re-export error types
pub use error::{AttrError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        AttrError, AttrKind, AttrMap, AttrRegistry, AttrValue, Decoded, decode_tagged,
        encode_tagged,
    };
}
