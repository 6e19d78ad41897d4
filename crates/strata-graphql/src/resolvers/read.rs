//! Single object read resolvers.
//!
//! Implements `car(id: ID!)`, the Relay `node(id: ID!)` lookup and `viewer`.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use strata_storage::USER_CLASS;
use tracing::debug;

use super::{
    ClassIndex, class_object_value, from_global_id, get_graphql_context, object_id_argument, storage_error,
};
use crate::schema::graphql_class_name;

/// Resolver for `<class>(id: ID!)` queries.
pub struct GetResolver;

impl GetResolver {
    /// Creates a resolver reading a single object of `class_name` by id.
    pub fn resolve(class_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&class_name);
        move |ctx| {
            let class_name = class_name.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let object_id = object_id_argument(&ctx, &graphql_class)?;
                debug!(class_name = %class_name, object_id = %object_id, "Resolving get query");

                let gql_ctx = get_graphql_context(&ctx)?;
                let object = gql_ctx
                    .db
                    .get(&class_name, &object_id)
                    .await
                    .map_err(storage_error)?;

                // A missing object is null, not an error.
                Ok(object.map(|object| class_object_value(&graphql_class, object)))
            })
        }
    }
}

/// Resolver for the Relay `node(id: ID!)` query.
pub struct NodeResolver;

impl NodeResolver {
    /// Creates a resolver over the classes in `classes`. Ids of other
    /// types resolve to null.
    pub fn resolve(
        classes: ClassIndex,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let classes = classes.clone();
            FieldFuture::new(async move {
                let id = ctx
                    .args
                    .get("id")
                    .and_then(|v| v.string().ok())
                    .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))?;

                let Some((graphql_class, object_id)) = from_global_id(id) else {
                    return Err(async_graphql::Error::new(format!("Invalid global id: {id}")));
                };
                let Some(class_name) = classes.class_for_type(&graphql_class) else {
                    debug!(graphql_class = %graphql_class, "node() for unknown class");
                    return Ok(None);
                };

                let gql_ctx = get_graphql_context(&ctx)?;
                let object = gql_ctx
                    .db
                    .get(class_name, &object_id)
                    .await
                    .map_err(storage_error)?;

                Ok(object.map(|object| {
                    FieldValue::value(class_object_value(&graphql_class, object))
                        .with_type(graphql_class.clone())
                }))
            })
        }
    }
}

/// Resolver for `viewer`: the authenticated user, re-read from storage.
pub struct ViewerResolver;

impl ViewerResolver {
    pub fn resolve() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let (Some(user), Some(user_id)) = (gql_ctx.user.clone(), gql_ctx.user_id()) else {
                    return Ok(None);
                };

                let stored = gql_ctx
                    .db
                    .get(USER_CLASS, user_id)
                    .await
                    .map_err(storage_error)?;
                let graphql_class = graphql_class_name(USER_CLASS);
                Ok(Some(class_object_value(&graphql_class, stored.unwrap_or(user))))
            })
        }
    }
}
