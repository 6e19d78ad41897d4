//! Storage error types for the collaborator layer.
//!
//! This module defines the errors that database, cloud function and cache
//! collaborators report back to the GraphQL engine.

/// Errors that can occur while talking to a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("Object not found: {class_name}/{object_id}")]
    NotFound {
        /// The class of the missing object.
        class_name: String,
        /// The id of the missing object.
        object_id: String,
    },

    /// The query or update document was rejected by the backend.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of why the query is invalid.
        message: String,
    },

    /// A cloud function failed or does not exist.
    #[error("Cloud function {name} failed: {message}")]
    Function {
        /// Name of the function that failed.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// Failed to reach the backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self::NotFound {
            class_name: class_name.into(),
            object_id: object_id.into(),
        }
    }

    /// Creates a new `InvalidQuery` error.
    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a new `Function` error.
    #[must_use]
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
