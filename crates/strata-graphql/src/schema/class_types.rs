//! Output, input, order and connection types of a class.

use async_graphql::dynamic::TypeRef;
use indexmap::IndexSet;
use strata_storage::{ClassSchema, FieldType, USER_CLASS};

use super::build::{ClassTypes, SchemaBuild, class_type_ref};
use super::defaults::{
    ANY_SCALAR, ARRAY_RESULT_UNION, BYTES_SCALAR, DATE_SCALAR, FILE_INFO_TYPE, GEO_POINT_INPUT,
    GEO_POINT_TYPE, NODE_INTERFACE, OBJECT_SCALAR, PAGE_INFO_TYPE,
};
use super::loader::ClassLoader;
use super::model::{
    FieldDef, GraphQLType, InputObjectType, InputValueDef, ObjectType, resolver,
};
use super::names::{graphql_class_name, is_valid_graphql_name};
use crate::config::{ClassConfig, TypeConfig};
use crate::error::GraphQLError;
use crate::registry::{AddOptions, CONNECTION_SUFFIX};
use crate::resolvers::{ASC_SUFFIX, ArrayResolver, DESC_SUFFIX, PointerResolver, RelationResolver};

/// Fields every class type has, whatever the class defines.
const BUILT_IN_FIELDS: &[&str] = &["id", "objectId", "createdAt", "updatedAt"];

/// Fields that are sortable on every class.
const BUILT_IN_SORT_FIELDS: &[&str] = &["objectId", "createdAt", "updatedAt"];

const PASSWORD_FIELD: &str = "password";

/// Registers `<Class>`, `Create<Class>FieldsInput`, `Update<Class>FieldsInput`,
/// `<Class>Order`, `<Class>Edge` and `<Class>Connection`.
pub struct ClassTypeLoader;

impl ClassLoader for ClassTypeLoader {
    fn name(&self) -> &'static str {
        "type"
    }

    fn load(
        &self,
        build: &mut SchemaBuild<'_>,
        class: &ClassSchema,
        class_config: Option<&ClassConfig>,
    ) -> Result<(), GraphQLError> {
        let type_config = class_config.and_then(|c| c.type_config.as_ref());
        let mut types = ClassTypes::new(&class.class_name);
        let graphql_name = types.graphql_name.clone();

        if !is_valid_graphql_name(&graphql_name) {
            build.warn_once(&format!(
                "Class {} could not be added to the auto schema because {graphql_name} is not a valid GraphQL name.",
                class.class_name
            ));
            build.set_class_types(types);
            return Ok(());
        }

        let mut fields: Vec<(&str, &FieldType)> = Vec::with_capacity(class.fields.len());
        for (name, field_type) in &class.fields {
            if BUILT_IN_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if !is_valid_graphql_name(name) || name.starts_with("__") {
                build.warn_once(&format!(
                    "Field {name} of class {} could not be added to the auto schema because it is not a valid GraphQL name.",
                    class.class_name
                ));
                continue;
            }
            fields.push((name.as_str(), field_type));
        }

        let mut output = ObjectType::new(&graphql_name)
            .description(format!(
                "The {graphql_name} object type is used in operations that involve outputting objects of {} class.",
                class.class_name
            ))
            .implement(NODE_INTERFACE)
            .field(FieldDef::new("id", TypeRef::named_nn(TypeRef::ID)).description("The Relay global id of the object."))
            .field(FieldDef::new("objectId", TypeRef::named_nn(TypeRef::ID)).description("The id of the object in the database."))
            .field(FieldDef::new("createdAt", TypeRef::named(DATE_SCALAR)).description("The date in which the object was created."))
            .field(FieldDef::new("updatedAt", TypeRef::named(DATE_SCALAR)).description("The date in which the object was last updated."));
        for &(name, field_type) in &fields {
            if is_output_field(class, type_config, name) {
                output = output.field(output_field(build, name, field_type));
            }
        }
        if build.add_graphql_type(output, AddOptions::default())?.is_none() {
            build.set_class_types(types);
            return Ok(());
        }
        types.output = Some(graphql_name.clone());

        let input_config = type_config.and_then(|t| t.input_fields.as_ref());
        types.create_input = add_input_type(
            build,
            format!("Create{graphql_name}FieldsInput"),
            &fields,
            input_config.and_then(|i| i.create.as_deref()),
        )?;
        types.update_input = add_input_type(
            build,
            format!("Update{graphql_name}FieldsInput"),
            &fields,
            input_config.and_then(|i| i.update.as_deref()),
        )?;

        let order_values = order_values(class, type_config, &fields);
        if !order_values.is_empty() {
            let order_name = format!("{graphql_name}Order");
            let order = GraphQLType::enumeration(&order_name, order_values);
            if build.add_graphql_type(order, AddOptions::default())?.is_some() {
                types.order = Some(order_name);
            }
        }

        let edge_name = format!("{graphql_name}Edge");
        let edge = ObjectType::new(&edge_name)
            .description(format!("An edge in a connection of {graphql_name} objects."))
            .field(FieldDef::new("node", TypeRef::named(&graphql_name)).description("The item at the end of the edge."))
            .field(FieldDef::new("cursor", TypeRef::named_nn(TypeRef::STRING)).description("A cursor for use in pagination."));
        if build.add_graphql_type(edge, AddOptions::default())?.is_some() {
            let connection_name = format!("{graphql_name}{CONNECTION_SUFFIX}");
            let connection = ObjectType::new(&connection_name)
                .description(format!("A connection to a list of {graphql_name} objects."))
                .field(FieldDef::new("edges", TypeRef::named_nn_list_nn(&edge_name)))
                .field(FieldDef::new("count", TypeRef::named_nn(TypeRef::INT)).description("The total number of matching objects."))
                .field(FieldDef::new("pageInfo", TypeRef::named_nn(PAGE_INFO_TYPE)));
            if build
                .add_graphql_type(connection, AddOptions::default().ignore_connection_suffix())?
                .is_some()
            {
                types.connection = Some(connection_name);
            }
            types.edge = Some(edge_name);
        }

        build.set_class_types(types);
        Ok(())
    }
}

fn is_output_field(class: &ClassSchema, type_config: Option<&TypeConfig>, name: &str) -> bool {
    if class.class_name == USER_CLASS && name == PASSWORD_FIELD {
        return false;
    }
    match type_config.and_then(|t| t.output_fields.as_ref()) {
        Some(allowed) => allowed.iter().any(|f| f == name),
        None => true,
    }
}

fn output_field(build: &SchemaBuild<'_>, name: &str, field_type: &FieldType) -> FieldDef {
    let named = |ty: &str| FieldDef::new(name, TypeRef::named(ty));
    match field_type {
        FieldType::String => named(TypeRef::STRING),
        FieldType::Number => named(TypeRef::FLOAT),
        FieldType::Boolean => named(TypeRef::BOOLEAN),
        FieldType::Date => named(DATE_SCALAR),
        FieldType::Object | FieldType::Acl => named(OBJECT_SCALAR),
        FieldType::Bytes => named(BYTES_SCALAR),
        FieldType::File => named(FILE_INFO_TYPE),
        FieldType::GeoPoint => named(GEO_POINT_TYPE),
        FieldType::Polygon => FieldDef::new(name, TypeRef::named_nn_list(GEO_POINT_TYPE)),
        FieldType::Array => FieldDef::new(name, TypeRef::named_list(ARRAY_RESULT_UNION))
            .resolve_with(resolver(ArrayResolver::resolve(name.to_string(), build.class_index()))),
        FieldType::Pointer { target_class } if build.is_class_selected(target_class) => {
            FieldDef::new(name, class_type_ref(build, target_class))
                .resolve_with(resolver(PointerResolver::resolve(name.to_string(), target_class.clone())))
        }
        FieldType::Relation { target_class } if build.is_class_selected(target_class) => {
            FieldDef::new(name, TypeRef::named_nn_list(graphql_class_name(target_class)))
                .resolve_with(resolver(RelationResolver::resolve(name.to_string(), target_class.clone())))
        }
        FieldType::Pointer { .. } | FieldType::Relation { .. } => named(OBJECT_SCALAR),
    }
}

fn input_type_ref(field_type: &FieldType) -> TypeRef {
    match field_type {
        FieldType::String => TypeRef::named(TypeRef::STRING),
        FieldType::Number => TypeRef::named(TypeRef::FLOAT),
        FieldType::Boolean => TypeRef::named(TypeRef::BOOLEAN),
        FieldType::Date => TypeRef::named(DATE_SCALAR),
        FieldType::Object | FieldType::Acl => TypeRef::named(OBJECT_SCALAR),
        FieldType::Bytes => TypeRef::named(BYTES_SCALAR),
        FieldType::File => TypeRef::named(ANY_SCALAR),
        FieldType::GeoPoint => TypeRef::named(GEO_POINT_INPUT),
        FieldType::Polygon => TypeRef::named_nn_list(GEO_POINT_INPUT),
        FieldType::Array => TypeRef::named_list(ANY_SCALAR),
        FieldType::Pointer { .. } => TypeRef::named(TypeRef::ID),
        FieldType::Relation { .. } => TypeRef::named_nn_list(TypeRef::ID),
    }
}

/// Registers an input type over `fields`, restricted to `allowed` when
/// given. Returns the type name, or `None` if it has no fields or collided.
fn add_input_type(
    build: &mut SchemaBuild<'_>,
    name: String,
    fields: &[(&str, &FieldType)],
    allowed: Option<&[String]>,
) -> Result<Option<String>, GraphQLError> {
    let mut input = InputObjectType::new(&name);
    for &(field, field_type) in fields {
        if allowed.is_none_or(|allowed| allowed.iter().any(|f| f == field)) {
            input = input.field(InputValueDef::new(field, input_type_ref(field_type)));
        }
    }
    if input.fields.is_empty() {
        return Ok(None);
    }
    Ok(build
        .add_graphql_type(input, AddOptions::default())?
        .map(|_| name))
}

fn order_values(
    class: &ClassSchema,
    type_config: Option<&TypeConfig>,
    fields: &[(&str, &FieldType)],
) -> IndexSet<String> {
    if let Some(sort_fields) = type_config.and_then(|t| t.sort_fields.as_ref()) {
        let mut values = IndexSet::new();
        for sort in sort_fields.iter().filter(|s| is_valid_graphql_name(&s.field)) {
            if sort.asc {
                values.insert(format!("{}{ASC_SUFFIX}", sort.field));
            }
            if sort.desc {
                values.insert(format!("{}{DESC_SUFFIX}", sort.field));
            }
        }
        return values;
    }

    let sortable = fields.iter().filter_map(|&(name, field_type)| {
        let scalar = matches!(
            field_type,
            FieldType::String | FieldType::Number | FieldType::Boolean | FieldType::Date
        );
        let hidden = class.class_name == USER_CLASS && name == PASSWORD_FIELD;
        (scalar && !hidden).then_some(name)
    });
    BUILT_IN_SORT_FIELDS
        .iter()
        .copied()
        .chain(sortable)
        .flat_map(|field| [format!("{field}{ASC_SUFFIX}"), format!("{field}{DESC_SUFFIX}")])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputFields, SortField};
    use crate::registry::WarnOnce;
    use crate::schema::defaults::load_scaffolding;

    fn car() -> ClassSchema {
        ClassSchema::new("Car")
            .with_field("name", FieldType::String)
            .with_field("owner", FieldType::Pointer { target_class: USER_CLASS.into() })
            .with_field("parts", FieldType::Array)
            .with_field("wheels", FieldType::Number)
    }

    fn field_names(build: &SchemaBuild<'_>, type_name: &str) -> Vec<String> {
        match build.types().get(type_name) {
            Some(GraphQLType::Object(t)) => t.fields.keys().cloned().collect(),
            Some(GraphQLType::InputObject(t)) => t.fields.keys().cloned().collect(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_generates_all_class_types() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        let car = car();
        build.select_classes([&car]);
        load_scaffolding(&mut build).unwrap();

        ClassTypeLoader.load(&mut build, &car, None).unwrap();

        let types = build.class_types("Car").unwrap().clone();
        assert_eq!(types.output.as_deref(), Some("Car"));
        assert_eq!(types.create_input.as_deref(), Some("CreateCarFieldsInput"));
        assert_eq!(types.update_input.as_deref(), Some("UpdateCarFieldsInput"));
        assert_eq!(types.order.as_deref(), Some("CarOrder"));
        assert_eq!(types.edge.as_deref(), Some("CarEdge"));
        assert_eq!(types.connection.as_deref(), Some("CarConnection"));

        assert_eq!(
            field_names(&build, "Car"),
            vec!["id", "objectId", "createdAt", "updatedAt", "name", "owner", "parts", "wheels"]
        );
        // `_User` is not selected, so the pointer falls back to `Object`.
        let owner = &build.types().get("Car").and_then(GraphQLType::fields).unwrap()["owner"];
        assert_eq!(owner.ty, TypeRef::named(OBJECT_SCALAR));

        match build.types().get("CarOrder") {
            Some(GraphQLType::Enum(order)) => {
                assert!(order.values.contains(&"name_ASC".to_string()));
                assert!(order.values.contains(&"createdAt_DESC".to_string()));
                assert!(!order.values.iter().any(|v| v.starts_with("parts")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_user_password_is_input_only() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        let user = ClassSchema::new(USER_CLASS)
            .with_field("password", FieldType::String)
            .with_field("username", FieldType::String);
        build.select_classes([&user]);

        ClassTypeLoader.load(&mut build, &user, None).unwrap();

        assert!(!field_names(&build, "User").contains(&"password".to_string()));
        assert!(field_names(&build, "CreateUserFieldsInput").contains(&"password".to_string()));
    }

    #[test]
    fn test_type_config_restricts_fields() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        let car = car();
        build.select_classes([&car]);
        let config = ClassConfig {
            type_config: Some(TypeConfig {
                input_fields: Some(InputFields {
                    create: Some(vec!["name".into()]),
                    update: Some(vec![]),
                }),
                output_fields: Some(vec!["wheels".into()]),
                constraint_fields: None,
                sort_fields: Some(vec![SortField {
                    field: "wheels".into(),
                    asc: true,
                    desc: false,
                }]),
            }),
            ..ClassConfig::new("Car")
        };

        ClassTypeLoader.load(&mut build, &car, Some(&config)).unwrap();

        assert_eq!(
            field_names(&build, "Car"),
            vec!["id", "objectId", "createdAt", "updatedAt", "wheels"]
        );
        assert_eq!(field_names(&build, "CreateCarFieldsInput"), vec!["name"]);
        let types = build.class_types("Car").unwrap();
        assert!(types.update_input.is_none());
        match build.types().get("CarOrder") {
            Some(GraphQLType::Enum(order)) => assert_eq!(order.values, vec!["wheels_ASC"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_reserved_class_name_is_skipped_with_warning() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        let class = ClassSchema::new("PageInfo").with_field("name", FieldType::String);
        build.select_classes([&class]);

        ClassTypeLoader.load(&mut build, &class, None).unwrap();

        assert!(build.class_types("PageInfo").unwrap().output.is_none());
        assert!(!build.types().contains("PageInfoEdge"));
        drop(build);
        assert!(warnings.contains(
            "Type PageInfo could not be added to the auto schema because it collided with an existing type."
        ));
    }
}
