//! Per-build accumulation state.
//!
//! A [`SchemaBuild`] is created at the start of every rebuild and owns the
//! registries that loaders write into. It is consumed by [`SchemaBuild::finish`]
//! on success and simply dropped on failure, so a failed build never leaves
//! half-registered types behind.

use std::collections::{BTreeSet, HashMap};

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use strata_storage::{ClassSchema, USER_CLASS};
use tracing::debug;

use crate::error::GraphQLError;
use crate::registry::{AddOptions, FieldRegistry, RootKind, TypeRegistry, WarnOnce};
use crate::resolvers::ClassIndex;
use crate::schema::model::{FieldDef, GraphQLType, ObjectType, SchemaModel};
use crate::schema::names::graphql_class_name;

/// Names of the types generated for one class.
///
/// A name is `None` when the type was not generated or was rejected as a
/// collision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTypes {
    pub class_name: String,
    pub graphql_name: String,
    pub output: Option<String>,
    pub edge: Option<String>,
    pub connection: Option<String>,
    pub create_input: Option<String>,
    pub update_input: Option<String>,
    pub order: Option<String>,
}

impl ClassTypes {
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            graphql_name: graphql_class_name(&class_name),
            class_name,
            ..Self::default()
        }
    }
}

/// Registries and lookup tables for a single build.
pub struct SchemaBuild<'w> {
    types: TypeRegistry,
    queries: FieldRegistry,
    mutations: FieldRegistry,
    subscriptions: FieldRegistry,
    class_types: IndexMap<String, ClassTypes>,
    class_index: ClassIndex,
    selected_classes: BTreeSet<String>,
    function_names: Vec<String>,
    is_users_class_disabled: bool,
    warnings: &'w mut WarnOnce,
}

impl<'w> SchemaBuild<'w> {
    pub fn new(warnings: &'w mut WarnOnce) -> Self {
        Self {
            types: TypeRegistry::new(),
            queries: FieldRegistry::new(RootKind::Query),
            mutations: FieldRegistry::new(RootKind::Mutation),
            subscriptions: FieldRegistry::new(RootKind::Subscription),
            class_types: IndexMap::new(),
            class_index: ClassIndex::new(),
            selected_classes: BTreeSet::new(),
            function_names: Vec::new(),
            is_users_class_disabled: false,
            warnings,
        }
    }

    /// Records the classes this build generates types for.
    pub fn select_classes<'c>(&mut self, classes: impl IntoIterator<Item = &'c ClassSchema>) {
        self.selected_classes = classes.into_iter().map(|c| c.class_name.clone()).collect();
        self.is_users_class_disabled = !self.selected_classes.contains(USER_CLASS);
    }

    pub fn set_function_names(&mut self, names: Vec<String>) {
        self.function_names = names;
    }

    /// Registers a type. See [`TypeRegistry::add`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] for a rejected name when
    /// `throw_on_collision` is set.
    pub fn add_graphql_type(
        &mut self,
        ty: impl Into<GraphQLType>,
        options: AddOptions,
    ) -> Result<Option<&GraphQLType>, GraphQLError> {
        self.types.add(ty.into(), options, self.warnings)
    }

    /// Registers a root query field. See [`FieldRegistry::add`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] for a rejected name when
    /// `throw_on_collision` is set.
    pub fn add_graphql_query(
        &mut self,
        name: impl Into<String>,
        field: FieldDef,
        options: AddOptions,
    ) -> Result<Option<&FieldDef>, GraphQLError> {
        self.queries.add(name, field, options, self.warnings)
    }

    /// Registers a root mutation field.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] for a rejected name when
    /// `throw_on_collision` is set.
    pub fn add_graphql_mutation(
        &mut self,
        name: impl Into<String>,
        field: FieldDef,
        options: AddOptions,
    ) -> Result<Option<&FieldDef>, GraphQLError> {
        self.mutations.add(name, field, options, self.warnings)
    }

    /// Registers a root subscription field.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] for a rejected name when
    /// `throw_on_collision` is set.
    pub fn add_graphql_subscription(
        &mut self,
        name: impl Into<String>,
        field: FieldDef,
        options: AddOptions,
    ) -> Result<Option<&FieldDef>, GraphQLError> {
        self.subscriptions.add(name, field, options, self.warnings)
    }

    /// Logs `message` unless this builder logged it before.
    pub fn warn_once(&mut self, message: &str) -> bool {
        self.warnings.warn(message)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn queries(&self) -> &FieldRegistry {
        &self.queries
    }

    pub fn mutations(&self) -> &FieldRegistry {
        &self.mutations
    }

    pub fn subscriptions(&self) -> &FieldRegistry {
        &self.subscriptions
    }

    pub fn class_types(&self, class_name: &str) -> Option<&ClassTypes> {
        self.class_types.get(class_name)
    }

    /// Every recorded [`ClassTypes`], in class processing order.
    pub fn all_class_types(&self) -> impl Iterator<Item = &ClassTypes> {
        self.class_types.values()
    }

    pub fn set_class_types(&mut self, types: ClassTypes) {
        self.class_types.insert(types.class_name.clone(), types);
    }

    /// Handle to the class <-> output type index of this build.
    ///
    /// Lookups miss until [`SchemaBuild::publish_class_index`] runs.
    pub fn class_index(&self) -> ClassIndex {
        self.class_index.clone()
    }

    /// Fills the class index from the classes whose output type was
    /// registered, in processing order.
    pub fn publish_class_index(&mut self) {
        let shadowed = self.class_index.publish(
            self.class_types
                .values()
                .filter_map(|t| Some((t.class_name.as_str(), t.output.as_deref()?))),
        );
        for (class_name, owner) in shadowed {
            self.warnings.warn(&format!(
                "Class {class_name} could not be resolved by its type because class {owner} already uses it."
            ));
        }
    }

    pub fn is_class_selected(&self, class_name: &str) -> bool {
        self.selected_classes.contains(class_name)
    }

    pub fn selected_classes(&self) -> impl Iterator<Item = &str> {
        self.selected_classes.iter().map(String::as_str)
    }

    pub fn function_names(&self) -> &[String] {
        &self.function_names
    }

    /// `true` when `_User` is not among the selected classes.
    pub fn is_users_class_disabled(&self) -> bool {
        self.is_users_class_disabled
    }

    /// Synthesizes the root types and assembles the auto schema.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::Collision`] if a root type name is already
    /// taken.
    pub fn finish(mut self) -> Result<SchemaModel, GraphQLError> {
        let roots = [
            std::mem::replace(&mut self.queries, FieldRegistry::new(RootKind::Query)),
            std::mem::replace(&mut self.mutations, FieldRegistry::new(RootKind::Mutation)),
            std::mem::replace(
                &mut self.subscriptions,
                FieldRegistry::new(RootKind::Subscription),
            ),
        ];

        let mut root_names: HashMap<RootKind, String> = HashMap::new();
        for registry in roots {
            if registry.is_empty() {
                continue;
            }
            let kind = registry.kind();
            let root = ObjectType {
                fields: registry.into_fields(),
                ..ObjectType::new(kind.type_name()).description(kind.description())
            };
            self.types.add(
                root.into(),
                AddOptions::default().throw_on_collision().ignore_reserved(),
                self.warnings,
            )?;
            root_names.insert(kind, kind.type_name().to_string());
        }

        let mut model = SchemaModel {
            types: self.types.into_types(),
            query: root_names.remove(&RootKind::Query),
            mutation: root_names.remove(&RootKind::Mutation),
            subscription: root_names.remove(&RootKind::Subscription),
            directives: Vec::new(),
        };
        for message in model.remove_dangling_references() {
            self.warnings.warn(&message);
        }

        debug!(
            types = model.types.len(),
            queries = model.query_fields().map_or(0, IndexMap::len),
            mutations = model.mutation_fields().map_or(0, IndexMap::len),
            "Assembled auto schema"
        );
        Ok(model)
    }
}

/// Returns the GraphQL type of a class's output type, or `Object` when the
/// class does not take part in this build.
pub(crate) fn class_type_ref(build: &SchemaBuild<'_>, class_name: &str) -> TypeRef {
    if build.is_class_selected(class_name) {
        TypeRef::named(graphql_class_name(class_name))
    } else {
        TypeRef::named(super::defaults::OBJECT_SCALAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_storage::FieldType;

    #[test]
    fn test_select_classes_tracks_user_class() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        let car = ClassSchema::new("Car");
        build.select_classes([&car]);
        assert!(build.is_users_class_disabled());
        assert!(build.is_class_selected("Car"));

        let user = ClassSchema::new("_User").with_field("username", FieldType::String);
        build.select_classes([&user, &car]);
        assert!(!build.is_users_class_disabled());
    }

    #[test]
    fn test_finish_synthesizes_root_types() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        build
            .add_graphql_query(
                "health",
                FieldDef::new("health", TypeRef::named_nn(TypeRef::BOOLEAN)),
                AddOptions::scaffolding(),
            )
            .unwrap();

        let model = build.finish().unwrap();
        assert_eq!(model.query.as_deref(), Some("Query"));
        assert!(model.mutation.is_none());
        assert_eq!(
            model.get("Query").unwrap().description(),
            Some("Query is the top level type for queries.")
        );
    }

    #[test]
    fn test_finish_fails_when_root_name_is_taken() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        build
            .add_graphql_type(ObjectType::new("Query"), AddOptions::default().ignore_reserved())
            .unwrap();
        build
            .add_graphql_query(
                "health",
                FieldDef::new("health", TypeRef::named_nn(TypeRef::BOOLEAN)),
                AddOptions::default(),
            )
            .unwrap();

        let err = build.finish().unwrap_err();
        assert!(matches!(err, GraphQLError::Collision(_)));
    }

    #[test]
    fn test_finish_drops_fields_of_unknown_type() {
        let mut warnings = WarnOnce::new();
        let mut build = SchemaBuild::new(&mut warnings);
        build
            .add_graphql_query(
                "ghost",
                FieldDef::new("ghost", TypeRef::named("Ghost")),
                AddOptions::default(),
            )
            .unwrap();
        build
            .add_graphql_query(
                "name",
                FieldDef::new("name", TypeRef::named(TypeRef::STRING)),
                AddOptions::default(),
            )
            .unwrap();

        let model = build.finish().unwrap();
        let query = model.query_fields().unwrap();
        assert!(!query.contains_key("ghost"));
        assert!(query.contains_key("name"));
        assert!(warnings.contains(
            "Field Query.ghost was removed from the schema because type Ghost does not exist."
        ));
    }
}
