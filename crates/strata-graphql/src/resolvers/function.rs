//! Cloud function resolvers.
//!
//! Functions return a `{"response": {"result": ...}}` envelope; only the
//! result reaches GraphQL.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use serde_json::Value;
use tracing::debug;

use super::{args_to_json, get_graphql_context, json_to_graphql_value, storage_error};

/// Extracts `response.result` from a function envelope.
pub(crate) fn unwrap_envelope(envelope: Value) -> Value {
    match envelope {
        Value::Object(mut map) => match map.remove("response") {
            Some(Value::Object(mut response)) => response.remove("result").unwrap_or(Value::Null),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Resolver for `callCloudCode(functionName: CloudCodeFunction!, params: Object): Any`.
pub struct CloudCodeResolver;

impl CloudCodeResolver {
    pub fn resolve() -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            FieldFuture::new(async move {
                let name = ctx
                    .args
                    .get("functionName")
                    .and_then(|v| v.enum_name().or_else(|_| v.string()).ok().map(str::to_string))
                    .ok_or_else(|| {
                        async_graphql::Error::new("Missing required argument 'functionName'")
                    })?;
                let params = match ctx.args.get("params") {
                    Some(v) => super::graphql_to_json_value(v.as_value()),
                    None => Value::Object(serde_json::Map::new()),
                };
                debug!(function = %name, "Calling cloud function");

                let gql_ctx = get_graphql_context(&ctx)?;
                let envelope = gql_ctx
                    .functions
                    .call(&gql_ctx.app_id, &name, params)
                    .await
                    .map_err(storage_error)?;

                Ok(Some(json_to_graphql_value(unwrap_envelope(envelope))))
            })
        }
    }
}

/// Resolver that forwards a field's arguments to a named cloud function.
pub struct FunctionResolver;

impl FunctionResolver {
    /// Creates a resolver calling `function_name` with the field arguments.
    pub fn resolve(function_name: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let function_name = function_name.clone();
            FieldFuture::new(async move {
                let params = args_to_json(&ctx);
                debug!(function = %function_name, "Resolving field through cloud function");

                let gql_ctx = get_graphql_context(&ctx)?;
                let envelope = gql_ctx
                    .functions
                    .call(&gql_ctx.app_id, &function_name, params)
                    .await
                    .map_err(storage_error)?;

                Ok(Some(json_to_graphql_value(unwrap_envelope(envelope))))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(
            unwrap_envelope(json!({"response": {"result": {"greeting": "hi"}}})),
            json!({"greeting": "hi"})
        );
        assert_eq!(unwrap_envelope(json!({"response": {}})), Value::Null);
        assert_eq!(unwrap_envelope(json!("bare")), Value::Null);
    }
}
