//! Types and root fields every auto schema contains.
//!
//! [`load_scaffolding`] runs before any class is processed, because class
//! types reference these types by name. [`load_trailing_defaults`] runs after
//! all classes, because `ArrayResult` and `viewer` depend on them.

use async_graphql::dynamic::{FieldFuture, TypeRef};
use async_graphql::Value;
use strata_storage::USER_CLASS;

use super::build::SchemaBuild;
use super::model::{
    FieldDef, GraphQLType, InputObjectType, InputValueDef, InterfaceType, ObjectType, UnionType,
    resolver,
};
use crate::error::GraphQLError;
use crate::registry::AddOptions;
use crate::resolvers::{CloudCodeResolver, NodeResolver, ViewerResolver};

pub const ANY_SCALAR: &str = "Any";
pub const OBJECT_SCALAR: &str = "Object";
pub const DATE_SCALAR: &str = "Date";
pub const BYTES_SCALAR: &str = "Bytes";
pub const FILE_INFO_TYPE: &str = "FileInfo";
pub const GEO_POINT_TYPE: &str = "GeoPoint";
pub const GEO_POINT_INPUT: &str = "GeoPointInput";
pub const PAGE_INFO_TYPE: &str = "PageInfo";
pub const READ_PREFERENCE_ENUM: &str = "ReadPreference";
pub const NODE_INTERFACE: &str = "Node";
pub const ELEMENT_TYPE: &str = "Element";
pub const ARRAY_RESULT_UNION: &str = "ArrayResult";
pub const CLOUD_CODE_FUNCTION_ENUM: &str = "CloudCodeFunction";

/// Registers the shared types and the Relay `node` field.
///
/// `node` resolves ids of every class selected for this build, so the
/// selection must be recorded before this runs.
///
/// # Errors
///
/// Scaffolding is registered with `throw_on_collision`; any collision is
/// returned as [`GraphQLError::Collision`].
pub fn load_scaffolding(build: &mut SchemaBuild<'_>) -> Result<(), GraphQLError> {
    let options = AddOptions::scaffolding();

    for (name, description) in [
        (ANY_SCALAR, "The Any scalar type is used in operations and types that involve any type of value."),
        (OBJECT_SCALAR, "The Object scalar type is used in operations and types that involve objects."),
        (DATE_SCALAR, "The Date scalar type is used in operations and types that involve dates."),
        (BYTES_SCALAR, "The Bytes scalar type is used in operations and types that involve base 64 binary data."),
    ] {
        build.add_graphql_type(GraphQLType::scalar(name, description), options)?;
    }

    build.add_graphql_type(
        ObjectType::new(FILE_INFO_TYPE)
            .description("The FileInfo object type is used to return the information about files.")
            .field(FieldDef::new("name", TypeRef::named_nn(TypeRef::STRING)).description("This is the file name."))
            .field(FieldDef::new("url", TypeRef::named_nn(TypeRef::STRING)).description("This is the url in which the file can be downloaded.")),
        options,
    )?;
    build.add_graphql_type(
        ObjectType::new(GEO_POINT_TYPE)
            .description("The GeoPoint object type is used to return the information about geo point fields.")
            .field(FieldDef::new("latitude", TypeRef::named_nn(TypeRef::FLOAT)))
            .field(FieldDef::new("longitude", TypeRef::named_nn(TypeRef::FLOAT))),
        options,
    )?;
    build.add_graphql_type(
        ObjectType::new(PAGE_INFO_TYPE)
            .description("Information about pagination in a connection.")
            .field(FieldDef::new("hasNextPage", TypeRef::named_nn(TypeRef::BOOLEAN)))
            .field(FieldDef::new("hasPreviousPage", TypeRef::named_nn(TypeRef::BOOLEAN)))
            .field(FieldDef::new("startCursor", TypeRef::named(TypeRef::STRING)))
            .field(FieldDef::new("endCursor", TypeRef::named(TypeRef::STRING))),
        options,
    )?;
    build.add_graphql_type(
        InputObjectType::new(GEO_POINT_INPUT)
            .description("The GeoPointInput type is used in operations that involve inputting fields of type geo point.")
            .field(InputValueDef::new("latitude", TypeRef::named_nn(TypeRef::FLOAT)))
            .field(InputValueDef::new("longitude", TypeRef::named_nn(TypeRef::FLOAT))),
        options,
    )?;
    build.add_graphql_type(
        GraphQLType::enumeration(READ_PREFERENCE_ENUM, ["PRIMARY", "PRIMARY_PREFERRED", "SECONDARY", "SECONDARY_PREFERRED", "NEAREST"]),
        options,
    )?;

    build.add_graphql_type(
        InterfaceType::new(NODE_INTERFACE)
            .description("An object with an ID.")
            .field(FieldDef::new("id", TypeRef::named_nn(TypeRef::ID)).description("The ID of the object.")),
        options,
    )?;
    let node_classes = build.class_index();
    build.add_graphql_query(
        "node",
        FieldDef::new("node", TypeRef::named(NODE_INTERFACE))
            .description("Fetches an object given its ID.")
            .argument(InputValueDef::new("id", TypeRef::named_nn(TypeRef::ID)))
            .resolve_with(resolver(NodeResolver::resolve(node_classes))),
        options,
    )?;

    build.add_graphql_type(
        ObjectType::new(ELEMENT_TYPE)
            .description("The Element object type is used to return array items' value.")
            .field(FieldDef::new("value", TypeRef::named_nn(ANY_SCALAR))),
        options,
    )?;

    Ok(())
}

/// Registers `ArrayResult`, the default queries and the default mutations.
///
/// # Errors
///
/// Returns [`GraphQLError::Collision`] if a default name is already taken.
pub fn load_trailing_defaults(build: &mut SchemaBuild<'_>) -> Result<(), GraphQLError> {
    let options = AddOptions::scaffolding();
    build.publish_class_index();

    let mut members = vec![ELEMENT_TYPE.to_string()];
    members.extend(build.all_class_types().filter_map(|t| t.output.clone()));
    build.add_graphql_type(
        GraphQLType::Union(UnionType {
            name: ARRAY_RESULT_UNION.into(),
            description: Some(
                "Use Inline Fragment on Array to get results: https://graphql.org/learn/queries/#inline-fragments".into(),
            ),
            members,
        }),
        options,
    )?;

    build.add_graphql_query(
        "health",
        FieldDef::new("health", TypeRef::named_nn(TypeRef::BOOLEAN))
            .description("The health query can be used to check if the server is up and running.")
            .resolve_with(resolver(|_| FieldFuture::new(async { Ok(Some(Value::Boolean(true))) }))),
        options,
    )?;

    if let Some(user_type) = build.class_types(USER_CLASS).and_then(|t| t.output.clone()) {
        build.add_graphql_query(
            "viewer",
            FieldDef::new("viewer", TypeRef::named(user_type))
                .description("The viewer query can be used to return the current user data.")
                .resolve_with(resolver(ViewerResolver::resolve())),
            options,
        )?;
    }

    if !build.function_names().is_empty() {
        let names = build.function_names().to_vec();
        build.add_graphql_type(
            GraphQLType::enumeration(CLOUD_CODE_FUNCTION_ENUM, names),
            options,
        )?;
        build.add_graphql_mutation(
            "callCloudCode",
            FieldDef::new("callCloudCode", TypeRef::named(ANY_SCALAR))
                .description("The callCloudCode mutation can be used to invoke a cloud code function.")
                .argument(InputValueDef::new("functionName", TypeRef::named_nn(CLOUD_CODE_FUNCTION_ENUM)))
                .argument(InputValueDef::new("params", TypeRef::named(OBJECT_SCALAR)))
                .resolve_with(resolver(CloudCodeResolver::resolve())),
            options,
        )?;
    }

    Ok(())
}
