//! Integration tests for custom schema extensions and schema directives.

use std::sync::Arc;

use async_graphql::dynamic::TypeRef;
use serde_json::json;
use strata_db_memory::{InMemoryDatabase, InMemoryFunctions};
use strata_graphql::schema::{
    CustomSchemaInput, DirectiveUse, FieldDef, GraphQLType, ObjectType, SchemaModel,
    apply_schema_directives, leaf_type_name,
};
use strata_graphql::{ClassSchemaBuilder, CustomSchema, GraphQLError};
use strata_storage::{ClassSchema, FieldType};

fn backend() -> (Arc<InMemoryDatabase>, Arc<InMemoryFunctions>) {
    let db = InMemoryDatabase::with_classes(vec![
        ClassSchema::new("Car").with_field("name", FieldType::String),
    ]);
    (Arc::new(db), Arc::new(InMemoryFunctions::new()))
}

fn builder_with(
    db: &Arc<InMemoryDatabase>,
    functions: &Arc<InMemoryFunctions>,
    custom: CustomSchema,
) -> ClassSchemaBuilder {
    ClassSchemaBuilder::builder()
        .with_database(db.clone())
        .with_functions(functions.clone())
        .with_custom_schema(custom)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_schema_object_is_merged_into_auto_schema() {
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

    let (db, functions) = backend();
    let builder = builder_with(&db, &functions, CustomSchema::Schema(custom));
    let schema = builder.load().await.unwrap();

    assert!(schema.model().contains("Driver"));
    let car = schema.model().get("Car").and_then(GraphQLType::fields).unwrap();
    assert!(car.contains_key("name"));
    assert_eq!(car.get("driver").map(|f| leaf_type_name(&f.ty)), Some("Driver"));
    assert!(!car.contains_key("ghost"));
    assert!(schema.sdl().contains("type Driver"));
}

#[tokio::test]
async fn test_custom_type_left_without_fields_is_dropped() {
    let mut custom = SchemaModel::new();
    custom.insert(
        ObjectType::new("Driver")
            .field(FieldDef::new("ghost", TypeRef::named("Ghost")))
            .into(),
    );
    custom.insert(
        ObjectType::new("Car")
            .field(FieldDef::new("driver", TypeRef::named("Driver")))
            .into(),
    );

    let (db, functions) = backend();
    let builder = builder_with(&db, &functions, CustomSchema::Schema(custom));
    let schema = builder.load().await.unwrap();

    assert!(!schema.model().contains("Driver"));
    let car = schema.model().get("Car").and_then(GraphQLType::fields).unwrap();
    assert!(car.contains_key("name"));
    assert!(!car.contains_key("driver"));
}

#[tokio::test]
async fn test_function_result_is_the_public_schema() {
    let custom = CustomSchema::from_fn(|input: CustomSchemaInput| {
        assert!(input.directives_schema.contains("@mock"));
        let mut schema = input.auto_schema;
        if let Some(GraphQLType::Object(query)) = schema.get_mut("Query") {
            let version = FieldDef::new("version", TypeRef::named(TypeRef::STRING))
                .directive(DirectiveUse::new("mock").argument("with", "1.0"));
            query.fields.insert("version".into(), version);
        }
        Ok(apply_schema_directives(schema, &input.schema_directives))
    });

    let (db, functions) = backend();
    let builder = builder_with(&db, &functions, custom);
    let schema = builder.load().await.unwrap();

    let response = schema.execute("{ version health }", builder.context("req-1")).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"version": "1.0", "health": true})
    );
}

#[tokio::test]
async fn test_function_error_fails_the_build() {
    let custom = CustomSchema::from_fn(|_| Err(GraphQLError::Internal("no schema today".into())));

    let (db, functions) = backend();
    let builder = builder_with(&db, &functions, custom);
    assert!(matches!(
        builder.load().await.unwrap_err(),
        GraphQLError::Internal(_)
    ));
    assert!(builder.current().await.is_none());
}

#[tokio::test]
async fn test_type_defs_are_stitched_with_directives() {
    let custom = CustomSchema::from_sdl(
        r#"
        extend type Query {
            hello: String @mock(with: "world")
            greet(name: String!): String @resolve(to: "greeter")
            shout(text: String!): String @resolve
        }
        type Garage { size: Int }
        extend type Car { garage: Garage }
        "#,
    )
    .unwrap();

    let (db, functions) = backend();
    functions.define("greeter", |params| {
        Ok(json!(format!("Hello {}", params["name"].as_str().unwrap_or_default())))
    });
    functions.define("shout", |params| {
        Ok(json!(params["text"].as_str().unwrap_or_default().to_uppercase()))
    });
    let builder = builder_with(&db, &functions, custom);
    let schema = builder.load().await.unwrap();

    assert!(schema.model().contains("Garage"));
    assert!(schema.model().directive("resolve").is_some());
    let car = schema.model().get("Car").and_then(GraphQLType::fields).unwrap();
    assert!(car.contains_key("garage"));
    let queries = schema.model().query_fields().unwrap();
    assert!(queries.contains_key("cars"));

    let response = schema
        .execute(
            r#"{ hello greet(name: "Ada") shout(text: "hey") }"#,
            builder.context("req-1"),
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"hello": "world", "greet": "Hello Ada", "shout": "HEY"})
    );
}

#[tokio::test]
async fn test_resolve_errors_carry_a_code() {
    let custom = CustomSchema::from_sdl("extend type Query { missing: String @resolve }").unwrap();

    let (db, functions) = backend();
    let builder = builder_with(&db, &functions, custom);
    let schema = builder.load().await.unwrap();

    let response = schema.execute("{ missing }", builder.context("req-1")).await;
    assert_eq!(response.errors.len(), 1);
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["errors"][0]["extensions"]["code"], json!("SCRIPT_FAILED"));
}

#[test]
fn test_invalid_type_defs_are_rejected() {
    let err = CustomSchema::from_sdl("type {").unwrap_err();
    assert!(matches!(err, GraphQLError::InvalidSettings(_)));
}
