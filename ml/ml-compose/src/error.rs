//! Error types for ml-compose crate.

use thiserror::Error;

/// Errors that can occur in ml-compose operations.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Duplicate source name.
    #[error("source name {0:?} duplicates")]
    DuplicateSource(String),

    /// Duplicate field name.
    #[error("field name {0:?} duplicates")]
    DuplicateField(String),

    /// Duplicate delegate name.
    #[error("delegate name {0:?} duplicates")]
    DuplicateDelegate(String),

    /// A source or delegate length disagrees with the dataset length.
    #[error("length mismatch for {name:?}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Name of the source or delegate.
        name: String,
        /// Length registered so far.
        expected: usize,
        /// Length being added.
        got: usize,
    },

    /// A field references a source that was never registered.
    #[error("field {field:?} references unknown source {source_name:?}")]
    UnknownSource {
        /// Field name.
        field: String,
        /// Source name.
        source_name: String,
    },

    /// Sample index out of bounds.
    #[error("index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The dataset length.
        len: usize,
    },

    /// A record-mode sample contained an unnamed field.
    #[error("unnamed field from {0:?}: record mode requires names")]
    UnnamedRecordField(String),

    /// No sources registered yet.
    #[error("no sources registered")]
    NoSources,

    /// Subset registered after virtual oversampling.
    #[error("subset must be registered before virtual oversampling")]
    SubsetAfterOversample,

    /// Virtual length unusable for the real length.
    #[error("virtual length {requested} is invalid for real length {real}")]
    InvalidVirtualLen {
        /// Requested virtual length.
        requested: usize,
        /// Real (subset-adjusted) length.
        real: usize,
    },

    /// Split lengths do not cover the dataset.
    #[error("split lengths sum to {got}, dataset length is {expected}")]
    SplitSumMismatch {
        /// Dataset length.
        expected: usize,
        /// Sum of requested lengths.
        got: usize,
    },

    /// Invalid split parameters.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Invalid loader configuration.
    #[error("invalid loader config: {0}")]
    InvalidLoaderConfig(String),
}

impl ComposeError {
    /// Creates a duplicate-source error.
    #[must_use]
    pub fn duplicate_source(name: impl Into<String>) -> Self {
        Self::DuplicateSource(name.into())
    }

    /// Creates a duplicate-field error.
    #[must_use]
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        Self::DuplicateField(name.into())
    }

    /// Creates a duplicate-delegate error.
    #[must_use]
    pub fn duplicate_delegate(name: impl Into<String>) -> Self {
        Self::DuplicateDelegate(name.into())
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::LengthMismatch {
            name: name.into(),
            expected,
            got,
        }
    }

    /// Creates an unknown-source error.
    #[must_use]
    pub fn unknown_source(field: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::UnknownSource {
            field: field.into(),
            source_name: source_name.into(),
        }
    }

    /// Creates an index out-of-bounds error.
    #[must_use]
    pub const fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Creates an unnamed record field error.
    #[must_use]
    pub fn unnamed_record_field(origin: impl Into<String>) -> Self {
        Self::UnnamedRecordField(origin.into())
    }

    /// Creates an invalid-split error.
    #[must_use]
    pub fn invalid_split(reason: impl Into<String>) -> Self {
        Self::InvalidSplit(reason.into())
    }

    /// Creates an invalid loader config error.
    #[must_use]
    pub fn invalid_loader_config(reason: impl Into<String>) -> Self {
        Self::InvalidLoaderConfig(reason.into())
    }
}

/// Result type for ml-compose operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_duplicate_source() {
        let err = ComposeError::duplicate_source("xs");
        assert!(err.to_string().contains("xs"));
    }

    #[test]
    fn error_length_mismatch() {
        let err = ComposeError::length_mismatch("ys", 100, 99);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("99"));
        assert!(msg.contains("ys"));
    }

    #[test]
    fn error_index_out_of_bounds() {
        let err = ComposeError::index_out_of_bounds(10, 10);
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn error_unknown_source() {
        let err = ComposeError::unknown_source("input_0", "pixels");
        let msg = err.to_string();
        assert!(msg.contains("input_0"));
        assert!(msg.contains("pixels"));
    }

    #[test]
    fn error_unnamed_record_field() {
        let err = ComposeError::unnamed_record_field("anon");
        assert!(err.to_string().contains("anon"));
    }

    #[test]
    fn error_split_sum_mismatch() {
        let err = ComposeError::SplitSumMismatch {
            expected: 10,
            got: 9,
        };
        assert!(err.to_string().contains("9"));
    }
}
