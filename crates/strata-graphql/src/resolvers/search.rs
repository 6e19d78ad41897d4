//! Connection resolver for `find` queries.
//!
//! Implements `cars(where: Object, order: [CarOrder!], skip: Int, first: Int)`
//! returning a Relay-style connection:
//!
//! ```graphql
//! { edges { cursor node { ... } } count pageInfo { hasNextPage ... } }
//! ```

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use async_graphql::{Name, Value};
use async_graphql::indexmap::IndexMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use strata_storage::FindQuery;
use tracing::debug;

use super::{class_object_value, get_graphql_context, object_argument, storage_error};
use crate::schema::graphql_class_name;

/// Suffixes of `<Class>Order` enum values.
pub const ASC_SUFFIX: &str = "_ASC";
pub const DESC_SUFFIX: &str = "_DESC";

/// Resolver for `find` connection queries.
pub struct FindResolver;

impl FindResolver {
    /// Creates a resolver searching objects of `class_name`.
    pub fn resolve(class_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        let graphql_class = graphql_class_name(&class_name);
        move |ctx| {
            let class_name = class_name.clone();
            let graphql_class = graphql_class.clone();
            FieldFuture::new(async move {
                let query = build_find_query(&ctx)?;
                debug!(class_name = %class_name, query = ?query, "Resolving find query");

                let gql_ctx = get_graphql_context(&ctx)?;
                let result = gql_ctx
                    .db
                    .find(&class_name, &query)
                    .await
                    .map_err(storage_error)?;

                let skip = query.skip;
                let returned = result.results.len();
                let edges: Vec<Value> = result
                    .results
                    .into_iter()
                    .enumerate()
                    .map(|(i, object)| {
                        object_value([
                            ("cursor", Value::String(cursor(skip + i))),
                            ("node", class_object_value(&graphql_class, object)),
                        ])
                    })
                    .collect();

                let (start_cursor, end_cursor) = if returned == 0 {
                    (Value::Null, Value::Null)
                } else {
                    (
                        Value::String(cursor(skip)),
                        Value::String(cursor(skip + returned - 1)),
                    )
                };
                let page_info = object_value([
                    ("hasNextPage", Value::Boolean(skip + returned < result.count)),
                    ("hasPreviousPage", Value::Boolean(skip > 0)),
                    ("startCursor", start_cursor),
                    ("endCursor", end_cursor),
                ]);

                Ok(Some(object_value([
                    ("edges", Value::List(edges)),
                    ("count", Value::from(result.count as i64)),
                    ("pageInfo", page_info),
                ])))
            })
        }
    }
}

/// Builds the storage query from `where`, `order`, `skip` and `first`.
fn build_find_query(ctx: &ResolverContext<'_>) -> Result<FindQuery, async_graphql::Error> {
    let mut query = FindQuery::new().with_constraints(object_argument(ctx, "where")?);

    if let Some(order) = ctx.args.get("order") {
        if let Ok(list) = order.list() {
            for item in list.iter() {
                query = with_order_value(query, item.enum_name()?)?;
            }
        } else if let Ok(value) = order.enum_name() {
            query = with_order_value(query, value)?;
        }
    }

    if let Some(skip) = ctx.args.get("skip").and_then(|v| v.i64().ok()) {
        query = query.with_skip(usize::try_from(skip).map_err(|_| {
            async_graphql::Error::new("Argument 'skip' must not be negative")
        })?);
    }
    if let Some(first) = ctx.args.get("first").and_then(|v| v.i64().ok()) {
        query = query.with_limit(usize::try_from(first).map_err(|_| {
            async_graphql::Error::new("Argument 'first' must not be negative")
        })?);
    }

    Ok(query)
}

fn with_order_value(query: FindQuery, value: &str) -> Result<FindQuery, async_graphql::Error> {
    let (field, ascending) = parse_order(value)
        .ok_or_else(|| async_graphql::Error::new(format!("Invalid order value: {value}")))?;
    Ok(query.with_order(field, ascending))
}

/// Splits `name_ASC` / `name_DESC` into the field and its direction.
pub(crate) fn parse_order(value: &str) -> Option<(&str, bool)> {
    if let Some(field) = value.strip_suffix(ASC_SUFFIX) {
        Some((field, true))
    } else {
        value.strip_suffix(DESC_SUFFIX).map(|field| (field, false))
    }
}

fn cursor(offset: usize) -> String {
    STANDARD.encode(offset.to_string())
}

fn object_value<const N: usize>(entries: [(&str, Value); N]) -> Value {
    let map: IndexMap<Name, Value> = entries
        .into_iter()
        .map(|(k, v)| (Name::new(k), v))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("name_ASC"), Some(("name", true)));
        assert_eq!(parse_order("created_at_DESC"), Some(("created_at", false)));
        assert_eq!(parse_order("name"), None);
    }

    #[test]
    fn test_cursor_is_base64_offset() {
        assert_eq!(cursor(0), "MA==");
        assert_eq!(cursor(12), "MTI=");
    }
}
