//! Declarative dataset composition for ML experiment workflows.
//!
//! This crate builds indexable samples out of named data sources, declared
//! fields with optional per-field transforms, and pluggable delegates:
//!
//! # Composition
//!
//! - [`SampleBuilder`] - Composes per-index samples from sources and fields
//! - [`Field`] / [`DelegateBinding`] - Field and delegate declarations
//! - [`Sample`] - Composed output, convertible to tuples or named records
//!
//! # Delegates
//!
//! - [`Delegate`] - Per-index generators for fields that draw from other
//!   rows of the data
//! - [`TripletDelegate`] - Anchor/positive/negative sampling for metric
//!   learning
//!
//! # Splitting
//!
//! - [`sequence_split`] / [`random_split`] - Index-block splits
//! - [`semi_split`] - Labeled/unlabeled/validation split for
//!   semi-supervised training
//! - [`ratio_to_lengths`] - Ratio list to integer lengths
//!
//! # Loading
//!
//! - [`LoaderConfig`] - Declarative batch-loader configuration; the actual
//!   loading is the host ecosystem's job
//!
//! # Example
//!
//! ```
//! use ml_compose::{Field, SampleBuilder, random_split};
//!
//! let builder = SampleBuilder::new()
//!     .add_inputs(vec![10, 20, 30, 40, 50])
//!     .unwrap()
//!     .add_labels(vec![0, 0, 1, 1, 1])
//!     .unwrap()
//!     .input_field(Field::named("value"))
//!     .unwrap()
//!     .label_field(Field::named("class"))
//!     .unwrap();
//!
//! let blocks = random_split(builder.len(), &[4, 1], Some(42)).unwrap();
//! let train = builder.subset(blocks[0].clone()).unwrap();
//! assert_eq!(train.len(), 4);
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

mod builder;
mod delegate;
mod error;
mod loader;
mod splits;

// Re-export composition types
pub use builder::{DelegateBinding, Field, Sample, SampleBuilder, Transform};

// Re-export delegate types
pub use delegate::{Delegate, Role, SampleItem, TripletDelegate};

// Re-export split utilities
pub use splits::{SemiSplit, random_split, ratio_to_lengths, semi_split, sequence_split};

// Re-export loader configuration
pub use loader::LoaderConfig;

// Re-export error types
pub use error::{ComposeError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ComposeError, Delegate, DelegateBinding, Field, LoaderConfig, Role, Sample, SampleBuilder,
        SampleItem, SemiSplit, TripletDelegate, random_split, ratio_to_lengths, semi_split,
        sequence_split,
    };
}
