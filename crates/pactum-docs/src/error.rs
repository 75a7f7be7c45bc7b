//! Error types for document generation.

use thiserror::Error;

/// Errors that can occur while building a contract document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Document metadata is missing a required field.
    #[error("Document missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A route cannot be expressed as an operation.
    #[error("Invalid operation '{method} {path}': {reason}")]
    InvalidOperation {
        /// HTTP method of the route.
        method: String,
        /// Path pattern of the route.
        path: String,
        /// The reason the operation is invalid.
        reason: String,
    },
}

/// Result type for document generation.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_invalid_operation_error() {
        let err = DocsError::InvalidOperation {
            method: "CONNECT".to_string(),
            path: "/tunnel".to_string(),
            reason: "unsupported HTTP method".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operation 'CONNECT /tunnel': unsupported HTTP method"
        );
    }
}
