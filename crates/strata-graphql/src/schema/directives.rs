//! Schema directives.
//!
//! - `@resolve(to: String)` - resolve the field by calling a cloud function
//!   (named `to`, or after the field)
//! - `@mock(with: Any!)` - resolve the field to a constant
//!
//! Directives are applied to the schema model once per build, replacing the
//! resolvers of the annotated fields. They are not advertised by the
//! executable schema.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, SubscriptionFieldFuture, TypeRef};
use futures_util::stream;
use tracing::debug;

use super::model::{
    DirectiveDef, DirectiveUse, FieldDef, GraphQLType, InputValueDef, Resolver, SchemaModel,
    resolver, subscription_resolver,
};
use crate::resolvers::FunctionResolver;

/// Directive name constants.
pub mod names {
    pub const RESOLVE: &str = "resolve";
    pub const MOCK: &str = "mock";
}

/// SDL of the directive definitions, prepended to custom type definitions.
pub const DIRECTIVES_SDL: &str = "\
directive @resolve(to: String) on FIELD_DEFINITION
directive @mock(with: Any!) on FIELD_DEFINITION
";

/// A schema-rewriting directive.
#[derive(Clone, Copy)]
pub struct SchemaDirective {
    pub name: &'static str,
    pub transform: fn(SchemaModel) -> SchemaModel,
}

impl std::fmt::Debug for SchemaDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDirective").field("name", &self.name).finish()
    }
}

/// The directive definitions.
pub fn directive_definitions() -> Vec<DirectiveDef> {
    vec![
        DirectiveDef {
            name: names::RESOLVE.into(),
            description: None,
            arguments: vec![InputValueDef::new("to", TypeRef::named(TypeRef::STRING))],
            locations: vec!["FIELD_DEFINITION".into()],
        },
        DirectiveDef {
            name: names::MOCK.into(),
            description: None,
            arguments: vec![InputValueDef::new("with", TypeRef::named_nn("Any"))],
            locations: vec!["FIELD_DEFINITION".into()],
        },
    ]
}

/// The schema directives, in the order they are applied.
pub fn schema_directives() -> Vec<SchemaDirective> {
    vec![
        SchemaDirective {
            name: names::RESOLVE,
            transform: resolve_directive,
        },
        SchemaDirective {
            name: names::MOCK,
            transform: mock_directive,
        },
    ]
}

/// Applies every directive in `directives` to `model`.
pub fn apply_schema_directives(model: SchemaModel, directives: &[SchemaDirective]) -> SchemaModel {
    directives
        .iter()
        .fold(model, |model, directive| (directive.transform)(model))
}

/// Points fields annotated with `@resolve` at a cloud function.
pub fn resolve_directive(mut model: SchemaModel) -> SchemaModel {
    for_each_annotated_field(&mut model, names::RESOLVE, |field, directive, _| {
        let function_name = match directive.arguments.get("to") {
            Some(Value::String(to)) => to.clone(),
            _ => field.name.clone(),
        };
        debug!(field = %field.name, function = %function_name, "Applying @resolve");
        field.resolver = Resolver::Field(resolver(FunctionResolver::resolve(function_name)));
    });
    model
}

/// Replaces the resolver of fields annotated with `@mock` by a constant.
pub fn mock_directive(mut model: SchemaModel) -> SchemaModel {
    for_each_annotated_field(&mut model, names::MOCK, |field, directive, is_subscription| {
        let value = directive.arguments.get("with").cloned().unwrap_or(Value::Null);
        debug!(field = %field.name, "Applying @mock");
        field.resolver = if is_subscription {
            Resolver::Subscription(subscription_resolver(move |_| {
                let value = value.clone();
                SubscriptionFieldFuture::new(async move {
                    Ok(stream::once(async move { Ok::<_, async_graphql::Error>(value) }))
                })
            }))
        } else {
            Resolver::Field(resolver(move |_| {
                let value = value.clone();
                FieldFuture::new(async move { Ok(Some(value)) })
            }))
        };
    });
    model
}

fn for_each_annotated_field(
    model: &mut SchemaModel,
    directive_name: &str,
    mut apply: impl FnMut(&mut FieldDef, &DirectiveUse, bool),
) {
    let subscription = model.subscription.clone();
    for ty in model.types.values_mut() {
        let GraphQLType::Object(object) = ty else {
            continue;
        };
        let is_subscription = subscription.as_deref() == Some(object.name.as_str());
        for field in object.fields.values_mut() {
            if let Some(directive) = field.find_directive(directive_name).cloned() {
                apply(field, &directive, is_subscription);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphQLSettings;
    use crate::schema::model::ObjectType;

    fn model_with(field: FieldDef) -> SchemaModel {
        let mut model = SchemaModel::new();
        model.insert(GraphQLType::scalar("Any", "Anything"));
        model.insert(ObjectType::new("Query").field(field).into());
        model.query = Some("Query".into());
        model
    }

    #[test]
    fn test_directives_sdl_matches_definitions() {
        let defs = directive_definitions();
        assert_eq!(defs.len(), 2);
        assert!(DIRECTIVES_SDL.contains("directive @resolve(to: String) on FIELD_DEFINITION"));
        assert!(DIRECTIVES_SDL.contains("directive @mock(with: Any!) on FIELD_DEFINITION"));
    }

    #[tokio::test]
    async fn test_mock_returns_constant() {
        let field = FieldDef::new("greeting", TypeRef::named(TypeRef::STRING))
            .directive(DirectiveUse::new(names::MOCK).argument("with", "hello world"));
        let model = apply_schema_directives(model_with(field), &schema_directives());

        let schema = model
            .to_executable::<()>(&GraphQLSettings::default(), None)
            .unwrap();
        let response = schema.execute("{ greeting }").await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({"greeting": "hello world"})
        );
    }

    #[test]
    fn test_resolve_replaces_only_annotated_fields() {
        let mut model = model_with(
            FieldDef::new("hello", TypeRef::named(TypeRef::STRING))
                .directive(DirectiveUse::new(names::RESOLVE)),
        );
        if let Some(GraphQLType::Object(query)) = model.get_mut("Query") {
            query.fields.insert(
                "plain".into(),
                FieldDef::new("plain", TypeRef::named(TypeRef::STRING)),
            );
        }

        let model = resolve_directive(model);
        let fields = model.query_fields().unwrap();
        assert!(matches!(fields["hello"].resolver, Resolver::Field(_)));
        assert!(matches!(fields["plain"].resolver, Resolver::Property));
    }
}
