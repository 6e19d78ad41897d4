//! Custom schema extensions.
//!
//! A custom schema is merged into the auto schema after every rebuild. The
//! kind of extension is fixed when the builder is configured:
//!
//! - [`CustomSchema::Schema`] - a schema model whose new types are added and
//!   whose overlapping types contribute their fields to the auto types
//! - [`CustomSchema::Function`] - a function receiving the auto schema and
//!   returning the public schema
//! - [`CustomSchema::TypeDefs`] - SDL stitched onto the auto schema, with the
//!   `@resolve` and `@mock` directives applied afterwards

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_graphql_parser::parse_schema;
use async_graphql_parser::types::ServiceDocument;
use tracing::debug;

use super::directives::{
    DIRECTIVES_SDL, SchemaDirective, apply_schema_directives, directive_definitions,
    schema_directives,
};
use super::document::SdlDefinitions;
use super::model::{GraphQLType, SchemaModel};
use crate::error::GraphQLError;
use crate::registry::{RootKind, WarnOnce};

/// What a [`CustomSchema::Function`] receives.
#[derive(Debug)]
pub struct CustomSchemaInput {
    /// SDL of the directive definitions.
    pub directives_schema: &'static str,
    /// The generated schema.
    pub auto_schema: SchemaModel,
    /// The schema directives, for functions that want to apply them.
    pub schema_directives: Vec<SchemaDirective>,
}

/// A function producing the public schema.
pub type CustomSchemaFn =
    Arc<dyn Fn(CustomSchemaInput) -> Result<SchemaModel, GraphQLError> + Send + Sync>;

/// A user supplied schema extension.
#[derive(Clone)]
pub enum CustomSchema {
    Schema(SchemaModel),
    Function(CustomSchemaFn),
    TypeDefs(ServiceDocument),
}

impl CustomSchema {
    /// Parses SDL type definitions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::InvalidSettings`] if `sdl` does not parse.
    pub fn from_sdl(sdl: &str) -> Result<Self, GraphQLError> {
        parse_schema(sdl)
            .map(Self::TypeDefs)
            .map_err(|e| GraphQLError::InvalidSettings(format!("Invalid custom type definitions: {e}")))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(CustomSchemaInput) -> Result<SchemaModel, GraphQLError> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Function(_) => "function",
            Self::TypeDefs(_) => "typeDefs",
        }
    }

    /// Merges this extension with `auto_schema` and returns the public schema.
    ///
    /// # Errors
    ///
    /// Only a [`CustomSchema::Function`] can fail; its error is returned
    /// unchanged.
    pub fn merge(
        &self,
        auto_schema: SchemaModel,
        warnings: &mut WarnOnce,
    ) -> Result<SchemaModel, GraphQLError> {
        debug!(kind = self.kind(), "Merging custom schema");
        match self {
            Self::Schema(custom) => Ok(merge_schema(auto_schema, custom, warnings)),
            Self::Function(f) => f(CustomSchemaInput {
                directives_schema: DIRECTIVES_SDL,
                auto_schema,
                schema_directives: schema_directives(),
            }),
            Self::TypeDefs(document) => {
                let definitions = SdlDefinitions::from_document(document);
                let stitched = stitch_type_defs(auto_schema, &definitions, warnings);
                Ok(apply_schema_directives(stitched, &schema_directives()))
            }
        }
    }
}

impl fmt::Debug for CustomSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(model) => f.debug_tuple("Schema").field(&model.types.len()).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::TypeDefs(document) => f
                .debug_tuple("TypeDefs")
                .field(&document.definitions.len())
                .finish(),
        }
    }
}

/// Adds the custom types missing from `auto_schema`, then folds the fields of
/// overlapping custom types into the auto types.
fn merge_schema(mut auto_schema: SchemaModel, custom: &SchemaModel, warnings: &mut WarnOnce) -> SchemaModel {
    for directive in &custom.directives {
        auto_schema.add_directive(directive.clone());
    }

    let names: BTreeSet<&str> = custom
        .types
        .keys()
        .map(String::as_str)
        .filter(|name| !name.starts_with("__"))
        .collect();
    let overlapping: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| auto_schema.contains(name))
        .collect();

    for name in &names {
        if !auto_schema.contains(name)
            && let Some(ty) = custom.get(name)
        {
            auto_schema.insert(ty.clone());
        }
    }

    for name in overlapping {
        let Some(custom_fields) = custom.get(name).and_then(GraphQLType::fields) else {
            continue;
        };
        match auto_schema.get_mut(name).and_then(GraphQLType::fields_mut) {
            Some(auto_fields) => {
                for (field_name, field) in custom_fields {
                    auto_fields.insert(field_name.clone(), field.clone());
                }
            }
            None => {
                warnings.warn(&format!(
                    "Custom type {name} could not be merged because the auto schema type with that name has no fields."
                ));
            }
        }
    }

    for message in auto_schema.remove_dangling_references() {
        warnings.warn(&message);
    }
    auto_schema
}

/// Stitches SDL definitions onto `auto_schema`.
fn stitch_type_defs(
    mut auto_schema: SchemaModel,
    definitions: &SdlDefinitions,
    warnings: &mut WarnOnce,
) -> SchemaModel {
    for directive in directive_definitions().into_iter().chain(definitions.directives.iter().cloned()) {
        auto_schema.add_directive(directive);
    }

    for sdl_type in &definitions.types {
        let mut incoming = sdl_type.ty.clone();
        let name = definitions.canonical_type_name(incoming.name()).to_string();
        rename(&mut incoming, &name);
        if name.starts_with("__") {
            continue;
        }

        match auto_schema.get_mut(&name) {
            Some(existing) => fold_type(existing, incoming, warnings),
            None => {
                if sdl_type.extend {
                    warnings.warn(&format!(
                        "Type {name} is extended by the custom type definitions but does not exist; it was added instead."
                    ));
                }
                auto_schema.insert(incoming);
            }
        }
    }

    // Custom definitions may introduce a root the auto schema did not need.
    let mutation = RootKind::Mutation.type_name();
    if auto_schema.mutation.is_none() && auto_schema.object(mutation).is_some() {
        auto_schema.mutation = Some(mutation.to_string());
    }
    let subscription = RootKind::Subscription.type_name();
    if auto_schema.subscription.is_none() && auto_schema.object(subscription).is_some() {
        auto_schema.subscription = Some(subscription.to_string());
    }

    for message in auto_schema.remove_dangling_references() {
        warnings.warn(&message);
    }
    auto_schema
}

fn rename(ty: &mut GraphQLType, name: &str) {
    let slot = match ty {
        GraphQLType::Scalar(t) => &mut t.name,
        GraphQLType::Object(t) => &mut t.name,
        GraphQLType::Interface(t) => &mut t.name,
        GraphQLType::Union(t) => &mut t.name,
        GraphQLType::Enum(t) => &mut t.name,
        GraphQLType::InputObject(t) => &mut t.name,
    };
    if *slot != name {
        *slot = name.to_string();
    }
}

/// Folds `incoming` into the same-named `existing` type.
///
/// Fields replace same-named fields; union members, enum values and
/// interfaces are appended without duplicates.
fn fold_type(existing: &mut GraphQLType, incoming: GraphQLType, warnings: &mut WarnOnce) {
    match (existing, incoming) {
        (GraphQLType::Object(existing), GraphQLType::Object(incoming)) => {
            existing.fields.extend(incoming.fields);
            append_unique(&mut existing.implements, incoming.implements);
            if existing.description.is_none() {
                existing.description = incoming.description;
            }
        }
        (GraphQLType::Interface(existing), GraphQLType::Interface(incoming)) => {
            existing.fields.extend(incoming.fields);
        }
        (GraphQLType::InputObject(existing), GraphQLType::InputObject(incoming)) => {
            existing.fields.extend(incoming.fields);
        }
        (GraphQLType::Union(existing), GraphQLType::Union(incoming)) => {
            append_unique(&mut existing.members, incoming.members);
        }
        (GraphQLType::Enum(existing), GraphQLType::Enum(incoming)) => {
            append_unique(&mut existing.values, incoming.values);
        }
        (GraphQLType::Scalar(_), GraphQLType::Scalar(_)) => {}
        (existing, incoming) => {
            warnings.warn(&format!(
                "Custom {} {} could not be merged into the existing {} with the same name.",
                incoming.kind(),
                incoming.name(),
                existing.kind()
            ));
        }
    }
}

fn append_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::dynamic::TypeRef;

    use super::*;
    use crate::schema::model::{FieldDef, ObjectType, Resolver};

    fn auto_schema() -> SchemaModel {
        let mut model = SchemaModel::new();
        model.insert(GraphQLType::scalar("Any", "Anything"));
        model.insert(
            ObjectType::new("Car")
                .field(FieldDef::new("name", TypeRef::named(TypeRef::STRING)))
                .into(),
        );
        model.insert(GraphQLType::enumeration("Color", ["RED"]));
        model.insert(
            ObjectType::new("Query")
                .field(FieldDef::new("car", TypeRef::named("Car")))
                .into(),
        );
        model.query = Some("Query".into());
        model
    }

    #[test]
    fn test_schema_merge_adds_new_types_and_folds_overlaps() {
        let mut custom = SchemaModel::new();
        custom.insert(
            ObjectType::new("Driver")
                .field(FieldDef::new("name", TypeRef::named(TypeRef::STRING)))
                .into(),
        );
        custom.insert(
            ObjectType::new("Car")
                .field(FieldDef::new("driver", TypeRef::named("Driver")))
                .field(FieldDef::new("ghost", TypeRef::named("Ghost")))
                .into(),
        );
        custom.insert(ObjectType::new("__Hidden").into());

        let mut warnings = WarnOnce::new();
        let merged = CustomSchema::Schema(custom)
            .merge(auto_schema(), &mut warnings)
            .unwrap();

        assert!(merged.contains("Driver"));
        assert!(!merged.contains("__Hidden"));
        let car: Vec<&str> = merged.object("Car").unwrap().fields.keys().map(String::as_str).collect();
        assert_eq!(car, vec!["name", "driver"]);
        assert!(warnings.contains(
            "Field Car.ghost was removed from the schema because type Ghost does not exist."
        ));
    }

    #[test]
    fn test_function_result_is_used_verbatim() {
        let custom = CustomSchema::from_fn(|input| {
            assert!(input.directives_schema.contains("@mock"));
            assert_eq!(input.schema_directives.len(), 2);
            let mut schema = input.auto_schema;
            schema.types.shift_remove("Color");
            Ok(schema)
        });

        let mut warnings = WarnOnce::new();
        let merged = custom.merge(auto_schema(), &mut warnings).unwrap();
        assert!(!merged.contains("Color"));
        assert!(merged.contains("Car"));
    }

    #[test]
    fn test_type_defs_are_stitched_and_directives_applied() {
        let custom = CustomSchema::from_sdl(
            r#"
            extend type Query { hello: String @resolve greeting: String @mock(with: "hi") }
            type Car { name: Int }
            enum Color { RED BLUE }
            type Mutation { ping: Boolean @mock(with: true) }
            "#,
        )
        .unwrap();

        let mut warnings = WarnOnce::new();
        let merged = custom.merge(auto_schema(), &mut warnings).unwrap();

        let query = merged.query_fields().unwrap();
        assert!(matches!(query["hello"].resolver, Resolver::Field(_)));
        assert!(matches!(query["greeting"].resolver, Resolver::Field(_)));
        assert!(matches!(query["car"].resolver, Resolver::Property));

        assert_eq!(merged.object("Car").unwrap().fields["name"].ty, TypeRef::named(TypeRef::INT));
        match merged.get("Color") {
            Some(GraphQLType::Enum(color)) => assert_eq!(color.values, vec!["RED", "BLUE"]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(merged.mutation.as_deref(), Some("Mutation"));
        assert!(merged.directive("resolve").is_some());
    }

    #[test]
    fn test_from_sdl_rejects_invalid_sdl() {
        let err = CustomSchema::from_sdl("type {").unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidSettings(_)));
    }
}
