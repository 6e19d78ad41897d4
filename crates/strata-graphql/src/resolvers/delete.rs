//! Delete mutation resolver.
//!
//! Handles `delete<Class>(id: ID!)` mutations. The deleted object is
//! returned as it was before deletion.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use strata_storage::StorageError;
use tracing::debug;

use super::{class_object_value, get_graphql_context, object_id_argument, storage_error};
use crate::schema::graphql_class_name;

/// Resolver for object deletion mutations.
pub struct DeleteResolver;

impl DeleteResolver {
    /// Creates a resolver deleting objects of `class_name`.
    pub fn resolve(class_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&class_name);
        move |ctx| {
            let class_name = class_name.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let object_id = object_id_argument(&ctx, &graphql_class)?;
                debug!(class_name = %class_name, object_id = %object_id, "Processing delete mutation");

                let gql_ctx = get_graphql_context(&ctx)?;
                let existing = gql_ctx
                    .db
                    .get(&class_name, &object_id)
                    .await
                    .map_err(storage_error)?
                    .ok_or_else(|| storage_error(StorageError::not_found(&class_name, &object_id)))?;

                gql_ctx
                    .db
                    .destroy(&class_name, &object_id)
                    .await
                    .map_err(storage_error)?;

                Ok(Some(class_object_value(&graphql_class, existing)))
            })
        }
    }
}
