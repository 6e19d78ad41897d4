//! Create mutation resolver.
//!
//! Handles `create<Class>(fields: Create<Class>FieldsInput)` mutations.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::debug;

use super::{class_object_value, get_graphql_context, object_argument, storage_error};
use crate::schema::graphql_class_name;

/// Resolver for object creation mutations.
///
/// ```graphql
/// mutation {
///   createCar(fields: {name: "Herbie"}) { id objectId name }
/// }
/// ```
pub struct CreateResolver;

impl CreateResolver {
    /// Creates a resolver creating objects of `class_name`.
    pub fn resolve(class_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&class_name);
        move |ctx| {
            let class_name = class_name.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let fields = object_argument(&ctx, "fields")?;
                debug!(class_name = %class_name, field_count = fields.len(), "Processing create mutation");

                let gql_ctx = get_graphql_context(&ctx)?;
                let created = gql_ctx
                    .db
                    .create(&class_name, fields)
                    .await
                    .map_err(storage_error)?;

                Ok(Some(class_object_value(&graphql_class, created)))
            })
        }
    }
}
