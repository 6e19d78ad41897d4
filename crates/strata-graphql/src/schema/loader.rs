//! The per-class loader seam.

use std::sync::Arc;

use strata_storage::ClassSchema;

use super::build::SchemaBuild;
use crate::config::ClassConfig;
use crate::error::GraphQLError;

/// Generates part of the schema for one class.
///
/// Loaders run in sequence for every selected class and register their
/// output through [`SchemaBuild::add_graphql_type`] and friends. An error
/// aborts the whole build; the previously built schema stays in use.
pub trait ClassLoader: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn load(
        &self,
        build: &mut SchemaBuild<'_>,
        class: &ClassSchema,
        class_config: Option<&ClassConfig>,
    ) -> Result<(), GraphQLError>;
}

/// Shared loader handle.
pub type DynClassLoader = Arc<dyn ClassLoader>;

/// The type, query and mutation loaders, in that order.
pub fn default_loaders() -> Vec<DynClassLoader> {
    vec![
        Arc::new(super::class_types::ClassTypeLoader),
        Arc::new(super::class_queries::ClassQueryLoader),
        Arc::new(super::class_mutations::ClassMutationLoader),
    ]
}
