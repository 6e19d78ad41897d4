//! GraphQL execution context.
//!
//! The context carries the collaborators generated resolvers talk to plus
//! request-specific state (the authenticated user). It is attached to each
//! request as request data.
//!
//! # Example
//!
//! ```ignore
//! use strata_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_db(db.clone())
//!     .with_functions(functions.clone())
//!     .with_app_id("my-app")
//!     .with_user(Some(user))
//!     .with_request_id("req-123")
//!     .build()?;
//! let response = schema.execute(request, context).await;
//! ```

use async_graphql::dynamic::ResolverContext;
use serde_json::Value;
use strata_storage::{DynCloudFunctions, DynDatabase};

/// Per-request resolver context.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Database used by class resolvers.
    pub db: DynDatabase,

    /// Cloud functions used by `callCloudCode` and `@resolve`.
    pub functions: DynCloudFunctions,

    /// Application id forwarded to cloud functions.
    pub app_id: String,

    /// The authenticated `_User` object, if any.
    pub user: Option<Value>,

    /// Request ID for tracing and correlation.
    pub request_id: String,
}

impl GraphQLContext {
    /// Returns whether the request is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns the `objectId` of the authenticated user.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref()?.get("objectId")?.as_str()
    }

    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }
}

impl std::fmt::Debug for GraphQLContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLContext")
            .field("app_id", &self.app_id)
            .field("user_id", &self.user_id())
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing GraphQLContext.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    db: Option<DynDatabase>,
    functions: Option<DynCloudFunctions>,
    app_id: Option<String>,
    user: Option<Value>,
    request_id: Option<String>,
}

impl GraphQLContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_db(mut self, db: DynDatabase) -> Self {
        self.db = Some(db);
        self
    }

    #[must_use]
    pub fn with_functions(mut self, functions: DynCloudFunctions) -> Self {
        self.functions = Some(functions);
        self
    }

    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Sets the authenticated user object.
    #[must_use]
    pub fn with_user(mut self, user: Option<Value>) -> Self {
        self.user = user;
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let db = self.db.ok_or(ContextBuilderError::MissingField("db"))?;
        let functions = self
            .functions
            .ok_or(ContextBuilderError::MissingField("functions"))?;
        let app_id = self
            .app_id
            .ok_or(ContextBuilderError::MissingField("app_id"))?;
        let request_id = self
            .request_id
            .ok_or(ContextBuilderError::MissingField("request_id"))?;

        Ok(GraphQLContext {
            db,
            functions,
            app_id,
            user: self.user,
            request_id,
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Helper to extract the context inside a resolver.
pub(crate) fn get_graphql_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a GraphQLContext, async_graphql::Error> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| async_graphql::Error::new("GraphQL context not available"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use strata_db_memory::{InMemoryDatabase, InMemoryFunctions};

    use super::*;

    #[test]
    fn test_builder_missing_db() {
        let result = GraphQLContextBuilder::new()
            .with_request_id("req-123")
            .build();

        assert!(matches!(result, Err(ContextBuilderError::MissingField("db"))));
    }

    #[test]
    fn test_builder_complete() {
        let context = GraphQLContext::builder()
            .with_db(Arc::new(InMemoryDatabase::new()))
            .with_functions(Arc::new(InMemoryFunctions::new()))
            .with_app_id("app")
            .with_user(Some(json!({"objectId": "u1", "username": "ada"})))
            .with_request_id("req-1")
            .build()
            .unwrap();

        assert!(context.is_authenticated());
        assert_eq!(context.user_id(), Some("u1"));
        assert_eq!(context.app_id, "app");
    }
}
