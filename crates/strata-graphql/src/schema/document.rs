//! Conversion of parsed SDL into schema model types.

use async_graphql::dynamic::TypeRef;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{
    BaseType, ConstDirective, DirectiveDefinition, FieldDefinition, InputValueDefinition,
    ServiceDocument, Type, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use indexmap::IndexMap;

use super::model::{
    DirectiveDef, DirectiveUse, EnumType, FieldDef, GraphQLType, InputObjectType, InputValueDef,
    InterfaceType, ObjectType, ScalarType, UnionType,
};

/// A type definition from an SDL document.
#[derive(Debug, Clone)]
pub struct SdlType {
    /// `true` for `extend type ...`.
    pub extend: bool,
    pub ty: GraphQLType,
}

/// The definitions of an SDL document.
#[derive(Debug, Clone, Default)]
pub struct SdlDefinitions {
    pub types: Vec<SdlType>,
    pub directives: Vec<DirectiveDef>,
    /// Root type names declared by a `schema { ... }` block.
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl SdlDefinitions {
    pub fn from_document(document: &ServiceDocument) -> Self {
        let mut definitions = Self::default();
        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = &schema.node;
                    if let Some(query) = &schema.query {
                        definitions.query = Some(query.node.to_string());
                    }
                    if let Some(mutation) = &schema.mutation {
                        definitions.mutation = Some(mutation.node.to_string());
                    }
                    if let Some(subscription) = &schema.subscription {
                        definitions.subscription = Some(subscription.node.to_string());
                    }
                }
                TypeSystemDefinition::Type(ty) => definitions.types.push(SdlType {
                    extend: ty.node.extend,
                    ty: convert_type(&ty.node),
                }),
                TypeSystemDefinition::Directive(directive) => {
                    definitions.directives.push(convert_directive_definition(&directive.node));
                }
            }
        }
        definitions
    }

    /// Maps a root type name declared in the document to the default root
    /// name (`Query`, `Mutation`, `Subscription`).
    pub fn canonical_type_name<'a>(&self, name: &'a str) -> &'a str {
        if self.query.as_deref() == Some(name) {
            "Query"
        } else if self.mutation.as_deref() == Some(name) {
            "Mutation"
        } else if self.subscription.as_deref() == Some(name) {
            "Subscription"
        } else {
            name
        }
    }
}

fn description(description: &Option<Positioned<String>>) -> Option<String> {
    description.as_ref().map(|d| d.node.clone())
}

pub(crate) fn convert_type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::named(name.to_string()),
        BaseType::List(inner) => TypeRef::List(Box::new(convert_type_ref(inner))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn convert_directive_use(directive: &ConstDirective) -> DirectiveUse {
    DirectiveUse {
        name: directive.name.node.to_string(),
        arguments: directive
            .arguments
            .iter()
            .map(|(name, value)| (name.node.to_string(), value.node.clone()))
            .collect(),
    }
}

fn convert_input_value(input: &InputValueDefinition) -> InputValueDef {
    InputValueDef {
        name: input.name.node.to_string(),
        ty: convert_type_ref(&input.ty.node),
        description: description(&input.description),
        default_value: input.default_value.as_ref().map(|v| v.node.clone()),
    }
}

fn convert_fields(fields: &[Positioned<FieldDefinition>]) -> IndexMap<String, FieldDef> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            let def = FieldDef {
                name: field.name.node.to_string(),
                ty: convert_type_ref(&field.ty.node),
                description: description(&field.description),
                arguments: field.arguments.iter().map(|a| convert_input_value(&a.node)).collect(),
                directives: field.directives.iter().map(|d| convert_directive_use(&d.node)).collect(),
                resolver: Default::default(),
            };
            (def.name.clone(), def)
        })
        .collect()
}

fn convert_type(definition: &TypeDefinition) -> GraphQLType {
    let name = definition.name.node.to_string();
    let description = description(&definition.description);
    match &definition.kind {
        TypeKind::Scalar => GraphQLType::Scalar(ScalarType { name, description }),
        TypeKind::Object(object) => GraphQLType::Object(ObjectType {
            name,
            description,
            implements: object.implements.iter().map(|i| i.node.to_string()).collect(),
            fields: convert_fields(&object.fields),
        }),
        TypeKind::Interface(interface) => GraphQLType::Interface(InterfaceType {
            name,
            description,
            fields: convert_fields(&interface.fields),
        }),
        TypeKind::Union(union) => GraphQLType::Union(UnionType {
            name,
            description,
            members: union.members.iter().map(|m| m.node.to_string()).collect(),
        }),
        TypeKind::Enum(enumeration) => GraphQLType::Enum(EnumType {
            name,
            description,
            values: enumeration.values.iter().map(|v| v.node.value.node.to_string()).collect(),
        }),
        TypeKind::InputObject(input) => GraphQLType::InputObject(InputObjectType {
            name,
            description,
            fields: input
                .fields
                .iter()
                .map(|f| {
                    let value = convert_input_value(&f.node);
                    (value.name.clone(), value)
                })
                .collect(),
        }),
    }
}

fn convert_directive_definition(definition: &DirectiveDefinition) -> DirectiveDef {
    DirectiveDef {
        name: definition.name.node.to_string(),
        description: description(&definition.description),
        arguments: definition.arguments.iter().map(|a| convert_input_value(&a.node)).collect(),
        locations: definition
            .locations
            .iter()
            .map(|l| screaming_snake_case(&format!("{:?}", l.node)))
            .collect(),
    }
}

/// `FieldDefinition` becomes `FIELD_DEFINITION`.
fn screaming_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    out
}
