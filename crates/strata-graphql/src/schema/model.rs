//! Inspectable schema model.
//!
//! The dynamic schema API of async-graphql is write-only: once a type is
//! registered it cannot be looked up, compared or extended. Schema synthesis
//! needs all three (collision checks, merges, tests), so types are first
//! collected into a [`SchemaModel`] and only turned into an executable
//! [`dynamic::Schema`] at the very end.
//!
//! Types reference each other by name, so replacing a type in the model
//! re-binds every reference to it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{
    self, Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface,
    InterfaceField, Object, ResolverContext, Scalar, Subscription, SubscriptionField,
    SubscriptionFieldFuture, TypeRef, Union,
};
use async_graphql::Value;
use futures_util::stream;
use indexmap::IndexMap;

use crate::config::GraphQLSettings;
use crate::error::GraphQLError;

/// A field resolver.
pub type ResolverFn =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// A subscription field resolver.
pub type SubscriptionResolverFn =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> SubscriptionFieldFuture<'a> + Send + Sync>;

/// Wraps a closure into a [`ResolverFn`].
pub fn resolver<F>(f: F) -> ResolverFn
where
    F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure into a [`SubscriptionResolverFn`].
pub fn subscription_resolver<F>(f: F) -> SubscriptionResolverFn
where
    F: for<'a> Fn(ResolverContext<'a>) -> SubscriptionFieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How a field produces its value.
#[derive(Clone, Default)]
pub enum Resolver {
    /// Reads the same-named property of the parent object.
    #[default]
    Property,
    /// A custom resolver.
    Field(ResolverFn),
    /// A subscription stream. Only meaningful on the subscription root.
    Subscription(SubscriptionResolverFn),
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => f.write_str("Property"),
            Self::Field(_) => f.write_str("Field(..)"),
            Self::Subscription(_) => f.write_str("Subscription(..)"),
        }
    }
}

/// A directive applied to a field, e.g. `@resolve(to: "hello")`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

impl DirectiveUse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

/// A directive definition, e.g. `directive @mock(with: Any!) on FIELD_DEFINITION`.
///
/// Definitions are kept for merging and inspection only; the executable
/// schema does not advertise them.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub locations: Vec<String>,
}

/// An argument or input object field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDef {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

impl InputValueDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn materialize(&self) -> InputValue {
        let mut input = InputValue::new(&self.name, self.ty.clone());
        if let Some(description) = &self.description {
            input = input.description(description);
        }
        if let Some(default) = &self.default_value {
            input = input.default_value(default.clone());
        }
        input
    }
}

/// An output field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub directives: Vec<DirectiveUse>,
    pub resolver: Resolver,
}

impl FieldDef {
    /// Creates a field resolved by parent property lookup.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            arguments: Vec::new(),
            directives: Vec::new(),
            resolver: Resolver::Property,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: InputValueDef) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: DirectiveUse) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn resolve_with(mut self, resolver: ResolverFn) -> Self {
        self.resolver = Resolver::Field(resolver);
        self
    }

    #[must_use]
    pub fn subscribe_with(mut self, resolver: SubscriptionResolverFn) -> Self {
        self.resolver = Resolver::Subscription(resolver);
        self
    }

    /// Returns the directive named `name`, if applied to this field.
    pub fn find_directive(&self, name: &str) -> Option<&DirectiveUse> {
        self.directives.iter().find(|d| d.name == name)
    }

    fn materialize(&self) -> Field {
        let field = match &self.resolver {
            Resolver::Field(f) => {
                let f = Arc::clone(f);
                Field::new(&self.name, self.ty.clone(), move |ctx| f(ctx))
            }
            Resolver::Property | Resolver::Subscription(_) => {
                let property = self.name.clone();
                Field::new(&self.name, self.ty.clone(), move |ctx| {
                    let property = property.clone();
                    FieldFuture::new(async move { Ok(parent_property(&ctx, &property)) })
                })
            }
        };
        let field = self
            .arguments
            .iter()
            .fold(field, |field, arg| field.argument(arg.materialize()));
        match &self.description {
            Some(description) => field.description(description),
            None => field,
        }
    }

    fn materialize_subscription(&self) -> SubscriptionField {
        let field = match &self.resolver {
            Resolver::Subscription(f) => {
                let f = Arc::clone(f);
                SubscriptionField::new(&self.name, self.ty.clone(), move |ctx| f(ctx))
            }
            // Without a stream source the subscription completes immediately.
            Resolver::Property | Resolver::Field(_) => {
                SubscriptionField::new(&self.name, self.ty.clone(), |_| {
                    SubscriptionFieldFuture::new(async {
                        Ok(stream::empty::<async_graphql::Result<Value>>())
                    })
                })
            }
        };
        let field = self
            .arguments
            .iter()
            .fold(field, |field, arg| field.argument(arg.materialize()));
        match &self.description {
            Some(description) => field.description(description),
            None => field,
        }
    }

    fn materialize_interface_field(&self) -> InterfaceField {
        let field = InterfaceField::new(&self.name, self.ty.clone());
        let field = self
            .arguments
            .iter()
            .fold(field, |field, arg| field.argument(arg.materialize()));
        match &self.description {
            Some(description) => field.description(description),
            None => field,
        }
    }
}

fn parent_property(ctx: &ResolverContext<'_>, property: &str) -> Option<Value> {
    match ctx.parent_value.as_value()? {
        Value::Object(obj) => obj.get(property).cloned(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub implements: Vec<String>,
    pub fields: IndexMap<String, FieldDef>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            implements: Vec::new(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    /// Adds a field, replacing any field with the same name.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValueDef>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: InputValueDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// A named GraphQL type.
#[derive(Debug, Clone)]
pub enum GraphQLType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl GraphQLType {
    pub fn scalar(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Scalar(ScalarType {
            name: name.into(),
            description: Some(description.into()),
        })
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumType {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn union<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Union(UnionType {
            name: name.into(),
            description: None,
            members: members.into_iter().map(Into::into).collect(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Object(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::InputObject(t) => &t.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(t) => t.description.as_deref(),
            Self::Object(t) => t.description.as_deref(),
            Self::Interface(t) => t.description.as_deref(),
            Self::Union(t) => t.description.as_deref(),
            Self::Enum(t) => t.description.as_deref(),
            Self::InputObject(t) => t.description.as_deref(),
        }
    }

    /// The SDL keyword of this kind of type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Object(_) => "type",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::InputObject(_) => "input",
        }
    }

    /// Output fields of an object or interface type.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        match self {
            Self::Object(t) => Some(&t.fields),
            Self::Interface(t) => Some(&t.fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut IndexMap<String, FieldDef>> {
        match self {
            Self::Object(t) => Some(&mut t.fields),
            Self::Interface(t) => Some(&mut t.fields),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(t) => Some(t),
            _ => None,
        }
    }
}

impl From<ObjectType> for GraphQLType {
    fn from(t: ObjectType) -> Self {
        Self::Object(t)
    }
}

impl From<InterfaceType> for GraphQLType {
    fn from(t: InterfaceType) -> Self {
        Self::Interface(t)
    }
}

impl From<InputObjectType> for GraphQLType {
    fn from(t: InputObjectType) -> Self {
        Self::InputObject(t)
    }
}

/// Scalars every schema has without registering them.
pub const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

/// Returns the named type at the bottom of list/non-null wrappers.
pub fn leaf_type_name(ty: &TypeRef) -> &str {
    match ty {
        TypeRef::Named(name) => name,
        TypeRef::NonNull(inner) | TypeRef::List(inner) => leaf_type_name(inner),
    }
}

/// A complete schema description.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    /// Named types in registration order.
    pub types: IndexMap<String, GraphQLType>,
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
    pub directives: Vec<DirectiveDef>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&GraphQLType> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GraphQLType> {
        self.types.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Inserts a type, replacing any type with the same name.
    pub fn insert(&mut self, ty: GraphQLType) {
        self.types.insert(ty.name().to_string(), ty);
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Returns the object type named `name`.
    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name).and_then(GraphQLType::as_object)
    }

    /// Returns the fields of the query root.
    pub fn query_fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        self.root_fields(self.query.as_deref())
    }

    pub fn mutation_fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        self.root_fields(self.mutation.as_deref())
    }

    pub fn subscription_fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        self.root_fields(self.subscription.as_deref())
    }

    fn root_fields(&self, root: Option<&str>) -> Option<&IndexMap<String, FieldDef>> {
        self.types.get(root?).and_then(GraphQLType::fields)
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.iter().find(|d| d.name == name)
    }

    /// Adds a directive definition unless one with that name exists.
    pub fn add_directive(&mut self, directive: DirectiveDef) {
        if self.directive(&directive.name).is_none() {
            self.directives.push(directive);
        }
    }

    /// Returns `true` if `name` is a built-in scalar or a type of this model.
    pub fn is_known_type(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.types.contains_key(name)
    }

    /// Removes every reference to a type that is not part of the model:
    /// fields (including fields with such an argument), input fields, union
    /// members and implemented interfaces.
    ///
    /// Object, interface and input types left without fields and unions left
    /// without members are removed as well, which can leave further
    /// references dangling, so pruning repeats until nothing changes. The
    /// query root is never removed.
    ///
    /// Returns one message per removed reference or type.
    pub fn remove_dangling_references(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        loop {
            let before = removed.len();
            self.prune_references(&mut removed);
            self.remove_empty_types(&mut removed);
            if removed.len() == before {
                return removed;
            }
        }
    }

    fn prune_references(&mut self, removed: &mut Vec<String>) {
        let known: HashSet<String> = self
            .types
            .keys()
            .cloned()
            .chain(BUILTIN_SCALARS.iter().map(|s| (*s).to_string()))
            .collect();
        let is_known = |ty: &TypeRef| known.contains(leaf_type_name(ty));

        for ty in self.types.values_mut() {
            let type_name = ty.name().to_string();
            match ty {
                GraphQLType::Object(ObjectType { fields, implements, .. }) => {
                    retain_fields(&type_name, fields, &is_known, removed);
                    implements.retain(|interface| {
                        let keep = known.contains(interface);
                        if !keep {
                            removed.push(format!(
                                "Type {type_name} no longer implements {interface} because it does not exist."
                            ));
                        }
                        keep
                    });
                }
                GraphQLType::Interface(InterfaceType { fields, .. }) => {
                    retain_fields(&type_name, fields, &is_known, removed);
                }
                GraphQLType::InputObject(InputObjectType { fields, .. }) => {
                    fields.retain(|name, field| {
                        let keep = is_known(&field.ty);
                        if !keep {
                            removed.push(dangling_message(&type_name, name, &field.ty));
                        }
                        keep
                    });
                }
                GraphQLType::Union(UnionType { members, .. }) => {
                    members.retain(|member| {
                        let keep = known.contains(member);
                        if !keep {
                            removed.push(format!(
                                "Union {type_name} no longer includes {member} because it does not exist."
                            ));
                        }
                        keep
                    });
                }
                GraphQLType::Scalar(_) | GraphQLType::Enum(_) => {}
            }
        }
    }

    fn remove_empty_types(&mut self, removed: &mut Vec<String>) {
        let query = self.query.clone();
        self.types.retain(|name, ty| {
            let empty = match ty {
                GraphQLType::Object(ObjectType { fields, .. })
                | GraphQLType::Interface(InterfaceType { fields, .. }) => fields.is_empty(),
                GraphQLType::InputObject(InputObjectType { fields, .. }) => fields.is_empty(),
                GraphQLType::Union(UnionType { members, .. }) => members.is_empty(),
                GraphQLType::Scalar(_) | GraphQLType::Enum(_) => false,
            };
            if !empty || query.as_deref() == Some(name.as_str()) {
                return true;
            }
            removed.push(format!(
                "Type {name} was removed from the schema because it has no fields or members left."
            ));
            false
        });
        if self.mutation.as_ref().is_some_and(|root| !self.types.contains_key(root)) {
            self.mutation = None;
        }
        if self.subscription.as_ref().is_some_and(|root| !self.types.contains_key(root)) {
            self.subscription = None;
        }
    }

    /// Builds the executable schema.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if the model has no query
    /// root or async-graphql rejects the type graph.
    pub fn to_executable<D>(
        &self,
        settings: &GraphQLSettings,
        data: Option<D>,
    ) -> Result<dynamic::Schema, GraphQLError>
    where
        D: std::any::Any + Send + Sync,
    {
        let query = self
            .query
            .as_deref()
            .ok_or_else(|| GraphQLError::SchemaBuildFailed("schema has no query root".into()))?;

        let mut builder = dynamic::Schema::build(
            query,
            self.mutation.as_deref(),
            self.subscription.as_deref(),
        );

        for ty in self.types.values() {
            builder = match ty {
                GraphQLType::Scalar(t) => {
                    let mut scalar = Scalar::new(&t.name);
                    if let Some(description) = &t.description {
                        scalar = scalar.description(description);
                    }
                    builder.register(scalar)
                }
                GraphQLType::Object(t) if Some(t.name.as_str()) == self.subscription.as_deref() => {
                    let mut subscription = Subscription::new(&t.name);
                    if let Some(description) = &t.description {
                        subscription = subscription.description(description);
                    }
                    for field in t.fields.values() {
                        subscription = subscription.field(field.materialize_subscription());
                    }
                    builder.register(subscription)
                }
                GraphQLType::Object(t) => {
                    let mut object = Object::new(&t.name);
                    if let Some(description) = &t.description {
                        object = object.description(description);
                    }
                    for interface in &t.implements {
                        object = object.implement(interface);
                    }
                    for field in t.fields.values() {
                        object = object.field(field.materialize());
                    }
                    builder.register(object)
                }
                GraphQLType::Interface(t) => {
                    let mut interface = Interface::new(&t.name);
                    if let Some(description) = &t.description {
                        interface = interface.description(description);
                    }
                    for field in t.fields.values() {
                        interface = interface.field(field.materialize_interface_field());
                    }
                    builder.register(interface)
                }
                GraphQLType::Union(t) => {
                    let mut union = Union::new(&t.name);
                    if let Some(description) = &t.description {
                        union = union.description(description);
                    }
                    for member in &t.members {
                        union = union.possible_type(member);
                    }
                    builder.register(union)
                }
                GraphQLType::Enum(t) => {
                    let mut enumeration = Enum::new(&t.name);
                    if let Some(description) = &t.description {
                        enumeration = enumeration.description(description);
                    }
                    for value in &t.values {
                        enumeration = enumeration.item(EnumItem::new(value));
                    }
                    builder.register(enumeration)
                }
                GraphQLType::InputObject(t) => {
                    let mut input = InputObject::new(&t.name);
                    if let Some(description) = &t.description {
                        input = input.description(description);
                    }
                    for field in t.fields.values() {
                        input = input.field(field.materialize());
                    }
                    builder.register(input)
                }
            };
        }

        if let Some(data) = data {
            builder = builder.data(data);
        }

        let mut builder = builder
            .limit_depth(settings.max_depth)
            .limit_complexity(settings.max_complexity);
        if !settings.introspection {
            builder = builder.disable_introspection();
        }

        builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))
    }
}

fn retain_fields(
    type_name: &str,
    fields: &mut IndexMap<String, FieldDef>,
    is_known: &impl Fn(&TypeRef) -> bool,
    removed: &mut Vec<String>,
) {
    fields.retain(|name, field| {
        let dangling = std::iter::once(&field.ty)
            .chain(field.arguments.iter().map(|arg| &arg.ty))
            .find(|ty| !is_known(ty));
        match dangling {
            Some(ty) => {
                removed.push(dangling_message(type_name, name, ty));
                false
            }
            None => true,
        }
    });
}

fn dangling_message(type_name: &str, field: &str, ty: &TypeRef) -> String {
    format!(
        "Field {type_name}.{field} was removed from the schema because type {} does not exist.",
        leaf_type_name(ty)
    )
}

/// Looks up `name` in a GraphQL object value.
pub(crate) fn object_property<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Name;

    fn sample_model() -> SchemaModel {
        let mut model = SchemaModel::new();
        model.insert(GraphQLType::scalar("Any", "Anything"));
        model.insert(
            ObjectType::new("Car")
                .field(FieldDef::new("name", TypeRef::named(TypeRef::STRING)))
                .into(),
        );
        model.insert(
            ObjectType::new("Query")
                .field(
                    FieldDef::new("car", TypeRef::named("Car")).resolve_with(resolver(|_| {
                        FieldFuture::new(async {
                            let mut car = async_graphql::indexmap::IndexMap::new();
                            car.insert(Name::new("name"), Value::from("Herbie"));
                            Ok(Some(Value::Object(car)))
                        })
                    })),
                )
                .into(),
        );
        model.query = Some("Query".into());
        model
    }

    #[test]
    fn test_leaf_type_name_unwraps_wrappers() {
        assert_eq!(leaf_type_name(&TypeRef::named("Car")), "Car");
        assert_eq!(leaf_type_name(&TypeRef::named_nn_list_nn("Car")), "Car");
        assert_eq!(leaf_type_name(&TypeRef::named_list("GeoPoint")), "GeoPoint");
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut model = sample_model();
        let count = model.types.len();
        model.insert(ObjectType::new("Car").into());
        assert_eq!(model.types.len(), count);
        assert!(model.object("Car").unwrap().fields.is_empty());
        assert_eq!(model.type_names().next(), Some("Any"));
    }

    #[test]
    fn test_root_fields() {
        let model = sample_model();
        let query = model.query_fields().unwrap();
        assert!(query.contains_key("car"));
        assert!(model.mutation_fields().is_none());
    }

    #[test]
    fn test_add_directive_is_idempotent() {
        let mut model = SchemaModel::new();
        let def = DirectiveDef {
            name: "mock".into(),
            description: None,
            arguments: vec![InputValueDef::new("with", TypeRef::named_nn("Any"))],
            locations: vec!["FIELD_DEFINITION".into()],
        };
        model.add_directive(def.clone());
        model.add_directive(def);
        assert_eq!(model.directives.len(), 1);
    }

    #[test]
    fn test_dangling_references_cascade() {
        let mut model = sample_model();
        model.insert(
            ObjectType::new("Driver")
                .field(FieldDef::new("ghost", TypeRef::named("Ghost")))
                .into(),
        );
        model.insert(
            ObjectType::new("Garage")
                .field(FieldDef::new("driver", TypeRef::named_nn("Driver")))
                .into(),
        );
        if let Some(GraphQLType::Object(car)) = model.get_mut("Car") {
            car.fields.insert("garage".into(), FieldDef::new("garage", TypeRef::named("Garage")));
        }
        model.insert(GraphQLType::Union(UnionType {
            name: "Parked".into(),
            description: None,
            members: vec!["Garage".into()],
        }));

        let removed = model.remove_dangling_references();

        assert!(!model.contains("Driver"));
        assert!(!model.contains("Garage"));
        assert!(!model.contains("Parked"));
        let car = model.object("Car").unwrap();
        assert!(car.fields.contains_key("name"));
        assert!(!car.fields.contains_key("garage"));
        assert!(removed.contains(
            &"Type Driver was removed from the schema because it has no fields or members left.".to_string()
        ));
        assert!(model.remove_dangling_references().is_empty());
        assert!(model.to_executable::<()>(&GraphQLSettings::default(), None).is_ok());
    }

    #[test]
    fn test_missing_query_root_fails() {
        let model = SchemaModel::new();
        let err = model
            .to_executable::<()>(&GraphQLSettings::default(), None)
            .unwrap_err();
        assert!(matches!(err, GraphQLError::SchemaBuildFailed(_)));
    }

    #[tokio::test]
    async fn test_executable_resolves_properties() {
        let schema = sample_model()
            .to_executable::<()>(&GraphQLSettings::default(), None)
            .unwrap();
        let response = schema.execute("{ car { name } }").await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({"car": {"name": "Herbie"}})
        );
    }
}
