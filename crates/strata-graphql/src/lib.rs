//! # strata-graphql
//!
//! Dynamic GraphQL schema synthesis for Strata applications.
//!
//! The schema is generated from the application's database classes, shaped by
//! a persisted, runtime-editable config, and can be extended with a custom
//! schema. It is rebuilt only when one of its inputs changes.
//!
//! ## Overview
//!
//! - Every class gets an output type, create/update inputs, an order enum and
//!   a Relay-style connection
//! - Every class gets `get`/`find` queries and `create`/`update`/`delete`
//!   mutations, each of which can be toggled or renamed per class
//! - Cloud functions are exposed through `callCloudCode` and the `@resolve`
//!   directive
//! - Type and field name collisions are logged once and the colliding item is
//!   left out
//!
//! ## Configuration
//!
//! Add to `strata.toml`:
//!
//! ```toml
//! [graphql]
//! app_id = "my-app"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! cache_config = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Engine settings and the persisted generation config
//! - [`fingerprint`] - Rebuild gate
//! - [`registry`] - Collision-checked type and root field registries
//! - [`schema`] - Schema builder, loaders, custom schemas and directives
//! - [`resolvers`] - Resolvers backed by the storage collaborators
//! - [`context`] - GraphQL execution context
//! - [`error`] - Error types and the resolver error sink

pub mod config;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod registry;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::{ClassConfig, ConfigAck, ConfigStore, GraphQLConfig, GraphQLSettings};
pub use context::{GraphQLContext, GraphQLContextBuilder};
pub use error::{GraphQLError, handle_error};
pub use fingerprint::{Fingerprint, should_rebuild};
pub use registry::{AddOptions, FieldRegistry, RootKind, TypeRegistry, WarnOnce};
pub use schema::{ClassSchemaBuilder, CustomSchema, SchemaModel, SynthesizedSchema};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
