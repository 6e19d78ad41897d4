//! GraphQL schema synthesis.
//!
//! The schema is described by a [`SchemaModel`] first and only turned into an
//! executable `async_graphql` schema at the end of a build, so custom schemas
//! and directives can rewrite it freely.
//!
//! ## Components
//!
//! - [`ClassSchemaBuilder`] - Builds and caches the schema, rebuilding when
//!   classes, config or function names change
//! - [`SchemaBuild`] - Per-build registries that loaders write into
//! - [`ClassLoader`] - Per-class generation step (types, queries, mutations)
//! - [`CustomSchema`] - User supplied extension merged into the auto schema
//! - [`directives`] - The `@resolve` and `@mock` schema directives
//!
//! ## Build order
//!
//! 1. Scaffolding: scalars, shared objects, the `Node` interface and `node`
//! 2. Every selected class, system classes first, through each loader
//! 3. `ArrayResult`, `health`, `viewer` and `callCloudCode`
//! 4. Root types, then the custom schema merge

mod build;
mod builder;
mod class_mutations;
mod class_queries;
mod class_types;
mod custom;
pub mod defaults;
pub mod directives;
mod document;
mod loader;
mod model;
mod names;

pub use build::{ClassTypes, SchemaBuild};
pub use builder::{ClassSchemaBuilder, ClassSchemaBuilderBuilder, SynthesizedSchema, select_classes};
pub use class_mutations::ClassMutationLoader;
pub use class_queries::ClassQueryLoader;
pub use class_types::ClassTypeLoader;
pub use custom::{CustomSchema, CustomSchemaFn, CustomSchemaInput};
pub use directives::{SchemaDirective, apply_schema_directives, schema_directives};
pub use loader::{ClassLoader, DynClassLoader, default_loaders};
pub use model::{
    BUILTIN_SCALARS, DirectiveDef, DirectiveUse, EnumType, FieldDef, GraphQLType,
    InputObjectType, InputValueDef, InterfaceType, ObjectType, Resolver, ResolverFn, ScalarType,
    SchemaModel, SubscriptionResolverFn, UnionType, leaf_type_name, resolver,
    subscription_resolver,
};
pub use names::{
    GRAPHQL_NAME_PATTERN, graphql_class_name, is_valid_graphql_name, lower_first, pluralize,
    upper_first,
};
