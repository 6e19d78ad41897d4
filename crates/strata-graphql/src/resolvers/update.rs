//! Update mutation resolver.
//!
//! Handles `update<Class>(id: ID!, fields: Update<Class>FieldsInput)` mutations.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::debug;

use super::{
    class_object_value, get_graphql_context, object_argument, object_id_argument, storage_error,
};
use crate::schema::graphql_class_name;

/// Resolver for object update mutations.
pub struct UpdateResolver;

impl UpdateResolver {
    /// Creates a resolver updating objects of `class_name`.
    ///
    /// Updating a missing object is an error.
    pub fn resolve(class_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&class_name);
        move |ctx| {
            let class_name = class_name.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let object_id = object_id_argument(&ctx, &graphql_class)?;
                let fields = object_argument(&ctx, "fields")?;
                debug!(class_name = %class_name, object_id = %object_id, "Processing update mutation");

                let gql_ctx = get_graphql_context(&ctx)?;
                let updated = gql_ctx
                    .db
                    .update(&class_name, &object_id, fields, false)
                    .await
                    .map_err(storage_error)?;

                Ok(Some(class_object_value(&graphql_class, updated)))
            })
        }
    }
}
