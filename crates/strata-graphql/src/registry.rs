//! Collision-checked registries for types and root fields.
//!
//! Every type and root field produced during a build is registered here.
//! A name that is reserved, already taken or (for types) ends in
//! `Connection` is rejected; the caller decides whether a rejection is fatal
//! or only worth a warning.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::warn;

use crate::error::GraphQLError;
use crate::schema::{FieldDef, GraphQLType};

/// Type names the auto schema never lets a class or extension claim.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "String",
    "Boolean",
    "Int",
    "Float",
    "ID",
    "ArrayResult",
    "Query",
    "Mutation",
    "Subscription",
    "CreateFileInput",
    "CreateFilePayload",
    "Viewer",
    "SignUpInput",
    "SignUpPayload",
    "LogInInput",
    "LogInPayload",
    "LogOutInput",
    "LogOutPayload",
    "CloudCodeFunction",
    "CallCloudCodeInput",
    "CallCloudCodePayload",
    "CreateClassInput",
    "CreateClassPayload",
    "UpdateClassInput",
    "UpdateClassPayload",
    "DeleteClassInput",
    "DeleteClassPayload",
    "PageInfo",
];

pub const RESERVED_QUERY_NAMES: &[&str] = &["health", "viewer", "class", "classes"];

pub const RESERVED_MUTATION_NAMES: &[&str] = &[
    "signUp",
    "logIn",
    "logOut",
    "createFile",
    "callCloudCode",
    "createClass",
    "updateClass",
    "deleteClass",
];

pub const RESERVED_SUBSCRIPTION_NAMES: &[&str] = &[];

/// Suffix reserved for generated connection types.
pub const CONNECTION_SUFFIX: &str = "Connection";

/// How a registration reacts to a rejected name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Return an error instead of warning.
    pub throw_on_collision: bool,
    /// Skip the reserved-name check.
    pub ignore_reserved: bool,
    /// Skip the `Connection` suffix check (types only).
    pub ignore_connection_suffix: bool,
}

impl AddOptions {
    #[must_use]
    pub fn throw_on_collision(mut self) -> Self {
        self.throw_on_collision = true;
        self
    }

    #[must_use]
    pub fn ignore_reserved(mut self) -> Self {
        self.ignore_reserved = true;
        self
    }

    #[must_use]
    pub fn ignore_connection_suffix(mut self) -> Self {
        self.ignore_connection_suffix = true;
        self
    }

    /// Options used for built-in scaffolding: fatal, reserved names allowed.
    #[must_use]
    pub fn scaffolding() -> Self {
        Self::default().throw_on_collision().ignore_reserved()
    }
}

/// Set of warning messages already logged.
///
/// Owned by a schema builder and shared by all of its builds, so a
/// collision that repeats on every rebuild is only reported once.
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: HashSet<String>,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `message` unless it was logged before. Returns `true` if logged.
    pub fn warn(&mut self, message: &str) -> bool {
        if self.seen.contains(message) {
            return false;
        }
        warn!("{message}");
        self.seen.insert(message.to_string());
        true
    }

    pub fn contains(&self, message: &str) -> bool {
        self.seen.contains(message)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Either raises a collision or warns about it, per `options`.
fn reject(message: String, options: AddOptions, warnings: &mut WarnOnce) -> Result<(), GraphQLError> {
    if options.throw_on_collision {
        return Err(GraphQLError::Collision(message));
    }
    warnings.warn(&message);
    Ok(())
}

/// Ordered, collision-checked list of named types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, GraphQLType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type.
    ///
    /// Returns the registered type, or `None` if the name was rejected and
    /// `options` did not ask for an error. A rejected type never replaces
    /// an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] if the name is rejected and
    /// `throw_on_collision` is set.
    pub fn add(
        &mut self,
        ty: GraphQLType,
        options: AddOptions,
        warnings: &mut WarnOnce,
    ) -> Result<Option<&GraphQLType>, GraphQLError> {
        let name = ty.name();
        let rejected = (!options.ignore_reserved && RESERVED_TYPE_NAMES.contains(&name))
            || self.types.contains_key(name)
            || (!options.ignore_connection_suffix && name.ends_with(CONNECTION_SUFFIX));

        if rejected {
            let message = format!(
                "Type {name} could not be added to the auto schema because it collided with an existing type."
            );
            reject(message, options, warnings)?;
            return Ok(None);
        }

        let name = name.to_string();
        let index = self.types.insert_full(name, ty).0;
        Ok(self.types.get_index(index).map(|(_, ty)| ty))
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

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn into_types(self) -> IndexMap<String, GraphQLType> {
        self.types
    }
}

/// The three root operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Query,
    Mutation,
    Subscription,
}

impl RootKind {
    /// Type name of the root, also used in collision messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        }
    }

    pub fn reserved_names(self) -> &'static [&'static str] {
        match self {
            Self::Query => RESERVED_QUERY_NAMES,
            Self::Mutation => RESERVED_MUTATION_NAMES,
            Self::Subscription => RESERVED_SUBSCRIPTION_NAMES,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Query => "Query is the top level type for queries.",
            Self::Mutation => "Mutation is the top level type for mutations.",
            Self::Subscription => "Subscription is the top level type for subscriptions.",
        }
    }
}

/// Ordered, collision-checked fields of one root type.
#[derive(Debug)]
pub struct FieldRegistry {
    kind: RootKind,
    fields: IndexMap<String, FieldDef>,
}

impl FieldRegistry {
    pub fn new(kind: RootKind) -> Self {
        Self {
            kind,
            fields: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> RootKind {
        self.kind
    }

    /// Registers a root field under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] if the name is rejected and
    /// `throw_on_collision` is set.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        mut field: FieldDef,
        options: AddOptions,
        warnings: &mut WarnOnce,
    ) -> Result<Option<&FieldDef>, GraphQLError> {
        let name = name.into();
        let rejected = (!options.ignore_reserved
            && self.kind.reserved_names().contains(&name.as_str()))
            || self.fields.contains_key(&name);

        if rejected {
            let message = format!(
                "{} {name} could not be added to the auto schema because it collided with an existing field.",
                self.kind.type_name()
            );
            reject(message, options, warnings)?;
            return Ok(None);
        }

        field.name = name.clone();
        let index = self.fields.insert_full(name, field).0;
        Ok(self.fields.get_index(index).map(|(_, field)| field))
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_fields(self) -> IndexMap<String, FieldDef> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::dynamic::TypeRef;

    use super::*;
    use crate::schema::ObjectType;

    fn object(name: &str) -> GraphQLType {
        ObjectType::new(name).into()
    }

    fn field(name: &str) -> FieldDef {
        FieldDef::new(name, TypeRef::named(TypeRef::STRING))
    }

    #[test]
    fn test_reserved_type_name_precedence() {
        let mut types = TypeRegistry::new();
        let mut warnings = WarnOnce::new();

        let added = types
            .add(object("String"), AddOptions::default(), &mut warnings)
            .unwrap();
        assert!(added.is_none());
        assert!(types.is_empty());

        let added = types
            .add(object("String"), AddOptions::default().ignore_reserved(), &mut warnings)
            .unwrap();
        assert_eq!(added.map(GraphQLType::name), Some("String"));
    }

    #[test]
    fn test_duplicate_type_is_rejected_without_replacing() {
        let mut types = TypeRegistry::new();
        let mut warnings = WarnOnce::new();
        let car = ObjectType::new("Car").field(field("name"));
        types.add(car.into(), AddOptions::default(), &mut warnings).unwrap();

        let added = types
            .add(object("Car"), AddOptions::default(), &mut warnings)
            .unwrap();
        assert!(added.is_none());
        assert_eq!(types.len(), 1);
        assert!(types.get("Car").unwrap().fields().unwrap().contains_key("name"));
    }

    #[test]
    fn test_connection_suffix() {
        let mut types = TypeRegistry::new();
        let mut warnings = WarnOnce::new();
        assert!(types
            .add(object("CarConnection"), AddOptions::default(), &mut warnings)
            .unwrap()
            .is_none());
        assert!(types
            .add(
                object("CarConnection"),
                AddOptions::default().ignore_connection_suffix(),
                &mut warnings
            )
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_throw_on_collision() {
        let mut types = TypeRegistry::new();
        let mut warnings = WarnOnce::new();
        let err = types
            .add(object("Query"), AddOptions::default().throw_on_collision(), &mut warnings)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type Query could not be added to the auto schema because it collided with an existing type."
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_warning_is_logged_once() {
        let mut types = TypeRegistry::new();
        let mut warnings = WarnOnce::new();
        types.add(object("Car"), AddOptions::default(), &mut warnings).unwrap();
        types.add(object("Car"), AddOptions::default(), &mut warnings).unwrap();
        types.add(object("Car"), AddOptions::default(), &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(!warnings.warn(
            "Type Car could not be added to the auto schema because it collided with an existing type."
        ));
    }

    #[test]
    fn test_root_field_collisions() {
        let mut queries = FieldRegistry::new(RootKind::Query);
        let mut warnings = WarnOnce::new();

        assert!(queries
            .add("health", field("health"), AddOptions::default(), &mut warnings)
            .unwrap()
            .is_none());
        assert!(queries
            .add("health", field("health"), AddOptions::default().ignore_reserved(), &mut warnings)
            .unwrap()
            .is_some());

        let err = queries
            .add("health", field("other"), AddOptions::scaffolding(), &mut warnings)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query health could not be added to the auto schema because it collided with an existing field."
        );
        assert_eq!(queries.len(), 1);
    }

    #[test]
    fn test_root_field_takes_registered_name() {
        let mut mutations = FieldRegistry::new(RootKind::Mutation);
        let mut warnings = WarnOnce::new();
        let added = mutations
            .add("registerCar", field("createCar"), AddOptions::default(), &mut warnings)
            .unwrap()
            .unwrap();
        assert_eq!(added.name, "registerCar");
        assert!(mutations.contains("registerCar"));
    }

    #[test]
    fn test_subscriptions_have_no_reserved_names() {
        let mut subscriptions = FieldRegistry::new(RootKind::Subscription);
        let mut warnings = WarnOnce::new();
        assert!(subscriptions
            .add("health", field("health"), AddOptions::default(), &mut warnings)
            .unwrap()
            .is_some());
    }
}
