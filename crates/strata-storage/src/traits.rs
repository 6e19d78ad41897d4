//! Collaborator traits consumed by the GraphQL engine.
//!
//! Backends implement these traits; the engine only ever talks to them
//! through `Arc<dyn ...>` handles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::types::{FindQuery, FindResult, SchemaController};

/// The database collaborator.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use strata_storage::{Database, StorageError};
///
/// async fn class_names(db: &dyn Database) -> Result<Vec<String>, StorageError> {
///     let schema = db.load_schema().await?;
///     Ok(schema.all_classes().into_iter().map(|c| c.class_name).collect())
/// }
/// ```
#[async_trait]
pub trait Database: Send + Sync {
    /// Loads a snapshot of the current class definitions.
    async fn load_schema(&self) -> Result<SchemaController, StorageError>;

    /// Reads a single object by id. Returns `None` if it does not exist.
    async fn get(&self, class_name: &str, object_id: &str) -> Result<Option<Value>, StorageError>;

    /// Finds objects of a class.
    async fn find(&self, class_name: &str, query: &FindQuery) -> Result<FindResult, StorageError>;

    /// Creates an object and returns it as stored (with `objectId`,
    /// `createdAt` and `updatedAt` filled in).
    async fn create(
        &self,
        class_name: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, StorageError>;

    /// Applies an update to an object and returns it as stored.
    ///
    /// Keys of `update` may use dot notation (`config.enabledForClasses`) to
    /// set a nested field without replacing its siblings. With `upsert`, a
    /// missing object is created with the given id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist and
    /// `upsert` is false.
    async fn update(
        &self,
        class_name: &str,
        object_id: &str,
        update: Map<String, Value>,
        upsert: bool,
    ) -> Result<Value, StorageError>;

    /// Deletes an object. Returns `false` if it did not exist.
    async fn destroy(&self, class_name: &str, object_id: &str) -> Result<bool, StorageError>;
}

/// The cloud function collaborator.
#[async_trait]
pub trait CloudFunctions: Send + Sync {
    /// Lists the names of the functions registered for an application.
    async fn function_names(&self, app_id: &str) -> Result<Vec<String>, StorageError>;

    /// Runs a function.
    ///
    /// The returned value is the `{"response": {"result": ...}}` envelope.
    async fn call(&self, app_id: &str, name: &str, params: Value) -> Result<Value, StorageError>;
}

/// A key/value cache with per-entry time-to-live.
#[async_trait]
pub trait CacheAdapter: Send + Sync {
    /// Returns the cached value, if present and not expired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores a value for `ttl`.
    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Removes a value.
    async fn delete(&self, key: &str);
}

/// Shared database handle.
pub type DynDatabase = Arc<dyn Database>;

/// Shared cloud function handle.
pub type DynCloudFunctions = Arc<dyn CloudFunctions>;

/// Shared cache handle.
pub type DynCache = Arc<dyn CacheAdapter>;
