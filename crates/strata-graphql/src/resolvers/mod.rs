//! Resolvers for generated class fields.
//!
//! - `read`: `car(id)`, `node(id)` and `viewer`
//! - `search`: `cars(where, order, skip, first)` connections
//! - `create`, `update`, `delete`: class mutations
//! - `relation`: pointer, relation and array fields
//! - `function`: `callCloudCode` and `@resolve` fields
//!
//! Objects handed to GraphQL always carry a Relay global `id`
//! (base64 of `<GraphQLClass>:<objectId>`) next to their stored fields.

mod create;
mod delete;
mod function;
mod index;
mod read;
mod relation;
mod search;
mod update;

pub use create::CreateResolver;
pub use delete::DeleteResolver;
pub use function::{CloudCodeResolver, FunctionResolver};
pub use index::ClassIndex;
pub use read::{GetResolver, NodeResolver, ViewerResolver};
pub use relation::{ArrayResolver, PointerResolver, RelationResolver};
pub use search::{ASC_SUFFIX, DESC_SUFFIX, FindResolver};
pub use update::UpdateResolver;

use async_graphql::dynamic::ResolverContext;
use async_graphql::{Name, Value};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Map;

pub(crate) use crate::context::get_graphql_context;

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f).unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Convert an async_graphql::Value (e.g. an argument) to serde_json::Value.
///
/// Enum values become strings; binary values become arrays of numbers.
pub(crate) fn graphql_to_json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Enum(name) => serde_json::Value::String(name.to_string()),
        Value::Binary(bytes) => serde_json::Value::Array(
            bytes.iter().map(|b| serde_json::Value::from(*b)).collect(),
        ),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(graphql_to_json_value).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.to_string(), graphql_to_json_value(v)))
                .collect(),
        ),
    }
}

/// Collects every argument of the current field into a JSON object.
pub(crate) fn args_to_json(ctx: &ResolverContext<'_>) -> serde_json::Value {
    serde_json::Value::Object(
        ctx.args
            .as_index_map()
            .iter()
            .map(|(k, v)| (k.to_string(), graphql_to_json_value(v)))
            .collect(),
    )
}

/// Reads an object-valued argument as a JSON map. Absent or null yields an
/// empty map.
pub(crate) fn object_argument(
    ctx: &ResolverContext<'_>,
    name: &str,
) -> Result<Map<String, serde_json::Value>, async_graphql::Error> {
    match ctx.args.get(name).map(|v| graphql_to_json_value(v.as_value())) {
        None | Some(serde_json::Value::Null) => Ok(Map::new()),
        Some(serde_json::Value::Object(map)) => Ok(map),
        Some(_) => Err(async_graphql::Error::new(format!(
            "Argument '{name}' must be an object"
        ))),
    }
}

/// Encodes a Relay global id.
pub fn to_global_id(graphql_class: &str, object_id: &str) -> String {
    STANDARD.encode(format!("{graphql_class}:{object_id}"))
}

/// Decodes a Relay global id into `(graphql_class, object_id)`.
pub fn from_global_id(global_id: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (class, object_id) = decoded.split_once(':')?;
    if class.is_empty() || object_id.is_empty() {
        return None;
    }
    Some((class.to_string(), object_id.to_string()))
}

/// Resolves an `id` argument to an `objectId`.
///
/// Accepts either a global id for `graphql_class` or a raw `objectId`.
pub(crate) fn object_id_argument(
    ctx: &ResolverContext<'_>,
    graphql_class: &str,
) -> Result<String, async_graphql::Error> {
    let id = ctx
        .args
        .get("id")
        .and_then(|v| v.string().ok())
        .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))?;

    Ok(match from_global_id(id) {
        Some((class, object_id)) if class == graphql_class => object_id,
        _ => id.to_string(),
    })
}

/// Converts a stored object into the value of a class type, adding its
/// global `id`.
pub(crate) fn class_object_value(graphql_class: &str, object: serde_json::Value) -> Value {
    let mut object = match object {
        serde_json::Value::Object(map) => map,
        other => return json_to_graphql_value(other),
    };
    if let Some(object_id) = object.get("objectId").and_then(serde_json::Value::as_str) {
        let id = to_global_id(graphql_class, object_id);
        object.insert("id".into(), serde_json::Value::String(id));
    }
    json_to_graphql_value(serde_json::Value::Object(object))
}

/// Reads the `objectId` out of a stored pointer (`{"__type": "Pointer", "objectId": ..}`)
/// or a bare id string.
pub(crate) fn pointer_object_id(value: &serde_json::Value) -> Option<&str> {
    match value {
        serde_json::Value::String(id) => Some(id),
        serde_json::Value::Object(map) => map.get("objectId")?.as_str(),
        _ => None,
    }
}

pub(crate) fn storage_error(e: strata_storage::StorageError) -> async_graphql::Error {
    crate::error::handle_error(e.into())
}
