//! Resolvers for fields that reference other objects.
//!
//! Pointer and relation fields are stored as pointers
//! (`{"__type": "Pointer", "className": "Car", "objectId": "x1"}`) and
//! fetched on access. Array fields resolve to the `ArrayResult` union.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::{Name, Value};
use strata_storage::DynDatabase;

use super::{ClassIndex, class_object_value, get_graphql_context, graphql_to_json_value, pointer_object_id, storage_error};
use crate::schema::defaults::ELEMENT_TYPE;
use crate::schema::graphql_class_name;

fn parent_field(ctx: &ResolverContext<'_>, field: &str) -> Option<serde_json::Value> {
    match ctx.parent_value.as_value()? {
        Value::Object(obj) => obj.get(field).map(graphql_to_json_value),
        _ => None,
    }
}

async fn fetch(
    db: &DynDatabase,
    class_name: &str,
    pointer: &serde_json::Value,
) -> Result<Option<serde_json::Value>, async_graphql::Error> {
    match pointer_object_id(pointer) {
        Some(object_id) => db.get(class_name, object_id).await.map_err(storage_error),
        None => Ok(None),
    }
}

/// Resolver for a pointer field: fetches the target object.
pub struct PointerResolver;

impl PointerResolver {
    pub fn resolve(
        field: String,
        target_class: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&target_class);
        move |ctx| {
            let field = field.clone();
            let target_class = target_class.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let Some(pointer) = parent_field(&ctx, &field) else {
                    return Ok(None);
                };
                let gql_ctx = get_graphql_context(&ctx)?;
                let object = fetch(&gql_ctx.db, &target_class, &pointer).await?;
                Ok(object.map(|object| class_object_value(&graphql_class, object)))
            })
        }
    }
}

/// Resolver for a relation field: fetches every related object.
///
/// Pointers to objects that no longer exist are skipped.
pub struct RelationResolver;

impl RelationResolver {
    pub fn resolve(
        field: String,
        target_class: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&target_class);
        move |ctx| {
            let field = field.clone();
            let target_class = target_class.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let Some(serde_json::Value::Array(pointers)) = parent_field(&ctx, &field) else {
                    return Ok(None);
                };
                let gql_ctx = get_graphql_context(&ctx)?;
                let mut objects = Vec::with_capacity(pointers.len());
                for pointer in &pointers {
                    if let Some(object) = fetch(&gql_ctx.db, &target_class, pointer).await? {
                        objects.push(class_object_value(&graphql_class, object));
                    }
                }
                Ok(Some(Value::List(objects)))
            })
        }
    }
}

/// Resolver for an array field typed `[ArrayResult]`.
///
/// Pointers to known classes become that class's type; every other element
/// is wrapped as `Element { value }`.
pub struct ArrayResolver;

impl ArrayResolver {
    /// `classes` maps class names to the GraphQL types that represent them.
    pub fn resolve(
        field: String,
        classes: ClassIndex,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field = field.clone();
            let classes = classes.clone();
            FieldFuture::new(async move {
                let Some(serde_json::Value::Array(items)) = parent_field(&ctx, &field) else {
                    return Ok(None);
                };
                let gql_ctx = get_graphql_context(&ctx)?;

                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let target = item
                        .get("className")
                        .and_then(serde_json::Value::as_str)
                        .and_then(|class_name| {
                            classes
                                .type_for_class(class_name)
                                .map(|ty| (class_name.to_string(), ty.to_string()))
                        });

                    let value = match target {
                        Some((class_name, graphql_class)) => {
                            match fetch(&gql_ctx.db, &class_name, &item).await? {
                                Some(object) => FieldValue::value(class_object_value(&graphql_class, object))
                                    .with_type(graphql_class),
                                None => element(item),
                            }
                        }
                        None => element(item),
                    };
                    values.push(value);
                }
                Ok(Some(FieldValue::list(values)))
            })
        }
    }
}

fn element<'a>(item: serde_json::Value) -> FieldValue<'a> {
    let mut obj = async_graphql::indexmap::IndexMap::new();
    obj.insert(Name::new("value"), super::json_to_graphql_value(item));
    FieldValue::value(Value::Object(obj)).with_type(ELEMENT_TYPE)
}
