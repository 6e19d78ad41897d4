//! In-memory collaborators for the Strata GraphQL engine.
//!
//! This crate implements the `strata-storage` traits without any external
//! service, which makes it the backend of choice for tests and for the CLI.
//!
//! # Example
//!
//! ```ignore
//! use strata_db_memory::InMemoryDatabase;
//! use strata_storage::{ClassSchema, Database, FieldType};
//!
//! let db = InMemoryDatabase::with_classes(vec![
//!     ClassSchema::new("Car").with_field("name", FieldType::String),
//! ]);
//! let car = db.create("Car", serde_json::Map::new()).await?;
//! ```

pub mod cache;
pub mod functions;
pub mod query;
pub mod storage;

pub use cache::MokaCache;
pub use functions::{CloudFunction, InMemoryFunctions};
pub use storage::{InMemoryDatabase, StorageKey};

// Re-export the collaborator traits for convenience
pub use strata_storage::{CacheAdapter, CloudFunctions, Database, StorageError};
