//! Error types for ml-attrs crate.

use thiserror::Error;

/// Errors that can occur in ml-attrs operations.
#[derive(Debug, Error)]
pub enum AttrError {
    /// A dotted path contained an empty segment.
    #[error("invalid path {path:?}: empty segment")]
    EmptySegment {
        /// The offending path.
        path: String,
    },

    /// A path traversed through a value that is not a map.
    #[error("cannot traverse {path:?}: {segment:?} is not a map")]
    NotAMap {
        /// The full path being resolved.
        path: String,
        /// The segment that resolved to a non-map value.
        segment: String,
    },

    /// A tagged payload named a different kind than expected.
    #[error("kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: String,
        /// The kind named by the payload (empty if untagged).
        found: String,
    },

    /// A typed value did not encode to a map.
    #[error("kind {0:?} did not encode to a map")]
    NotAnObject(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AttrError {
    /// Creates an empty-segment error.
    #[must_use]
    pub fn empty_segment(path: impl Into<String>) -> Self {
        Self::EmptySegment { path: path.into() }
    }

    /// Creates a not-a-map error.
    #[must_use]
    pub fn not_a_map(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::NotAMap {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Creates a kind mismatch error.
    #[must_use]
    pub fn kind_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::KindMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a not-an-object error.
    #[must_use]
    pub fn not_an_object(kind: impl Into<String>) -> Self {
        Self::NotAnObject(kind.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization(reason.into())
    }
}

impl From<serde_json::Error> for AttrError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for ml-attrs operations.
pub type Result<T> = std::result::Result<T, AttrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_segment() {
        let err = AttrError::empty_segment("a..b");
        assert!(err.to_string().contains("a..b"));
    }

    #[test]
    fn error_not_a_map() {
        let err = AttrError::not_a_map("a.b.c", "b");
        assert!(err.to_string().contains("a.b.c"));
        assert!(err.to_string().contains("\"b\""));
    }

    #[test]
    fn error_kind_mismatch() {
        let err = AttrError::kind_mismatch("loader_config", "other");
        assert!(err.to_string().contains("loader_config"));
        assert!(err.to_string().contains("other"));
    }

    #[test]
    fn error_not_an_object() {
        let err = AttrError::not_an_object("scalar");
        assert!(err.to_string().contains("scalar"));
    }

    #[test]
    fn error_from_serde_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: AttrError = json_err.into();
        assert!(matches!(err, AttrError::Serialization(_)));
    }
}
