//! Error types for the deep read/write engine
//!
//! Provides error handling for schema construction, request parameter
//! parsing, nested-write validation, and storage collaborator failures.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for engine operations
pub type DeepResult<T> = Result<T, Error>;

/// Error types for engine operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Schema describes a relation whose target entity is not declared.
    /// Fatal at startup, never recoverable at request time.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A request parameter is type-malformed (e.g. a non-integer depth).
    /// Unknown filter or ordering fields are dropped, not errors.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A node in a nested write failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The operation is not available for the handler's use case.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Opaque failure from the storage collaborator, passed through unchanged.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Field validation failures for one node of a nested write payload.
///
/// `path` locates the node within the payload: relation names joined by
/// `.`, with to-many children indexed (`"comments.1"`). The root node has
/// an empty path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
pub struct ValidationFailure {
    /// Location of the failing node within the nested payload
    pub path: String,
    /// Map of field names to their validation messages
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationFailure {
    /// Create an empty failure for the node at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Record a validation message for a field of this node
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Builder form of [`add`](Self::add)
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Check whether any field failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Merge another node's failures into this one
    pub fn merge(&mut self, other: ValidationFailure) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Convert to a JSON-serializable shape for a structured failure response
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "path": self.path,
                "fields": self.errors,
            }
        })
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = if self.path.is_empty() { "root" } else { &self.path };
        write!(f, "Validation failed at '{}'", node)?;
        for (field, messages) in &self.errors {
            for message in messages {
                write!(f, "\n  {}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_collects_per_field() {
        let mut failure = ValidationFailure::new("comments.1");
        failure.add("text", "expected text value");
        failure.add("text", "field is required");
        failure.add("rating", "expected integer value");

        assert_eq!(failure.len(), 2);
        assert_eq!(failure.errors["text"].len(), 2);
        assert!(!failure.is_empty());
    }

    #[test]
    fn test_validation_failure_display_names_path_and_field() {
        let failure = ValidationFailure::new("author").with_error("name", "expected text value");
        let rendered = failure.to_string();
        assert!(rendered.contains("'author'"));
        assert!(rendered.contains("name: expected text value"));
    }

    #[test]
    fn test_validation_failure_merge() {
        let mut first = ValidationFailure::new("").with_error("title", "expected text value");
        let second = ValidationFailure::new("").with_error("title", "field is required");
        first.merge(second);
        assert_eq!(first.errors["title"].len(), 2);
    }

    #[test]
    fn test_validation_failure_to_json_carries_path() {
        let failure = ValidationFailure::new("comments.0").with_error("text", "field is required");
        let json = failure.to_json();
        assert_eq!(json["error"]["path"], "comments.0");
        assert!(json["error"]["fields"]["text"].is_array());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("depth must be a non-negative integer".to_string());
        assert!(err.to_string().starts_with("Invalid parameter:"));

        let err = Error::Schema("relation 'author' targets undeclared entity 'User'".to_string());
        assert!(err.to_string().starts_with("Schema error:"));
    }
}
