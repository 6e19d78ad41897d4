//! Error types for GraphQL schema synthesis.
//!
//! This module defines the error types used throughout the GraphQL layer and
//! the error sink resolvers funnel their failures through.

use async_graphql::ErrorExtensions;
use strata_storage::StorageError;
use tracing::error;

/// Errors that can occur while synthesizing or configuring the schema.
#[derive(Debug, thiserror::Error)]
pub enum GraphQLError {
    /// The persisted GraphQL config (or a partial update of it) is malformed.
    /// Every violation found is listed.
    #[error("Invalid graphQLConfig: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// A type or root field could not be registered.
    #[error("{0}")]
    Collision(String),

    /// A collaborator (database, cloud functions) failed.
    #[error(transparent)]
    Upstream(#[from] StorageError),

    /// The accumulated types could not be turned into an executable schema.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// Static engine settings are invalid.
    #[error("Invalid GraphQL settings: {0}")]
    InvalidSettings(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GraphQLError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidConfig(_) | Self::InvalidSettings(_) => 400,
            Self::Upstream(StorageError::NotFound { .. }) => 404,
            Self::Upstream(StorageError::InvalidQuery { .. }) => 400,
            Self::Upstream(StorageError::Connection { .. }) => 503,
            Self::Upstream(_) | Self::Collision(_) | Self::SchemaBuildFailed(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Collision(_) => "COLLISION",
            Self::Upstream(err) => storage_error_code(err),
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidSettings(_) => "INVALID_SETTINGS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

fn storage_error_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::NotFound { .. } => "OBJECT_NOT_FOUND",
        StorageError::Function { .. } => "SCRIPT_FAILED",
        StorageError::InvalidQuery { .. } => "INVALID_QUERY",
        _ => "UPSTREAM_ERROR",
    }
}

/// Logs `error` and converts it into the error a resolver returns.
///
/// Errors from this crate or the storage layer are logged in short form;
/// anything else is logged with its full cause chain. There is no success
/// path: callers always propagate the returned value as `Err`.
pub fn handle_error(error: anyhow::Error) -> async_graphql::Error {
    let (message, code) = if let Some(err) = error.downcast_ref::<GraphQLError>() {
        error!(error = %err, code = err.error_code(), "Strata error");
        (err.to_string(), err.error_code())
    } else if let Some(err) = error.downcast_ref::<StorageError>() {
        let code = storage_error_code(err);
        error!(error = %err, code, "Strata error");
        (err.to_string(), code)
    } else {
        error!(error = ?error, "Uncaught internal server error");
        (error.to_string(), "INTERNAL_SERVER_ERROR")
    };

    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_message() {
        let err = GraphQLError::InvalidConfig(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid graphQLConfig: a; b");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GraphQLError::Collision("x".into()).status_code(), 500);
        assert_eq!(
            GraphQLError::from(StorageError::not_found("Car", "1")).status_code(),
            404
        );
        assert_eq!(
            GraphQLError::from(StorageError::connection("down")).status_code(),
            503
        );
    }

    #[test]
    fn test_handle_error_domain_error_keeps_message_and_code() {
        let err = handle_error(GraphQLError::Collision("Type X collided".into()).into());
        assert_eq!(err.message, "Type X collided");
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("COLLISION")));
    }

    #[test]
    fn test_handle_error_storage_error() {
        let err = handle_error(StorageError::function("hello", "boom").into());
        assert_eq!(err.message, "Cloud function hello failed: boom");
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("SCRIPT_FAILED")));
    }

    #[test]
    fn test_handle_error_unknown_error() {
        let err = handle_error(anyhow::anyhow!("kaboom").context("while resolving"));
        assert_eq!(err.message, "while resolving");
        let code = err.extensions.as_ref().and_then(|e| e.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("INTERNAL_SERVER_ERROR")));
    }
}
