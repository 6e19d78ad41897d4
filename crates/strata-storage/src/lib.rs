//! # strata-storage
//!
//! Collaborator traits and types for the Strata GraphQL engine.
//!
//! This crate defines the interfaces the schema builder consumes. It does not
//! contain any implementations - those are provided by separate crates
//! (see `strata-db-memory`).
//!
//! ## Overview
//!
//! - [`Database`] - class snapshots plus object CRUD used by generated resolvers
//!   and by the persisted GraphQL config record
//! - [`CloudFunctions`] - function name listing and invocation
//! - [`CacheAdapter`] - TTL cache used by the config store
//!
//! ## Example
//!
//! ```ignore
//! use strata_storage::{Database, FindQuery};
//!
//! async fn red_cars(db: &dyn Database) -> Result<usize, strata_storage::StorageError> {
//!     let query = FindQuery::new().with_constraint("color", "red".into());
//!     Ok(db.find("Car", &query).await?.count)
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::{
    CacheAdapter, CloudFunctions, Database, DynCache, DynCloudFunctions, DynDatabase,
};
pub use types::{
    AUTH_DATA_PREFIX, ClassSchema, DEFAULT_FIELDS, FieldType, FindQuery, FindResult,
    RESERVED_CLASS_PREFIX, SchemaController, SortKey, USER_CLASS,
};
