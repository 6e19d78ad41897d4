//! Class schema builder.
//!
//! [`ClassSchemaBuilder`] turns the class list, the persisted GraphQL config
//! and the cloud function names into an executable schema. The result is
//! cached together with the [`Fingerprint`] of its inputs; `load()` only
//! rebuilds when that fingerprint changes.
//!
//! # Example
//!
//! ```ignore
//! let builder = ClassSchemaBuilder::builder()
//!     .with_database(db)
//!     .with_functions(functions)
//!     .with_settings(GraphQLSettings::default())
//!     .build()?;
//!
//! let schema = builder.load().await?;
//! let response = schema.execute("{ health }", builder.context("req-1")).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_graphql::dynamic::Schema;
use indexmap::IndexMap;
use strata_storage::{
    AUTH_DATA_PREFIX, ClassSchema, DynCache, DynCloudFunctions, DynDatabase, USER_CLASS,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, trace};

use super::build::SchemaBuild;
use super::custom::CustomSchema;
use super::defaults::{load_scaffolding, load_trailing_defaults};
use super::loader::{DynClassLoader, default_loaders};
use super::model::SchemaModel;
use super::names::is_valid_graphql_name;
use crate::config::{ConfigStore, GraphQLConfig, GraphQLSettings};
use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use crate::fingerprint::{Fingerprint, should_rebuild};
use crate::registry::WarnOnce;

/// The result of one build. Never mutated; a rebuild produces a new one.
pub struct SynthesizedSchema {
    model: SchemaModel,
    executable: Schema,
}

impl SynthesizedSchema {
    /// The type model the executable schema was built from.
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn executable(&self) -> &Schema {
        &self.executable
    }

    /// Returns the schema in SDL form.
    pub fn sdl(&self) -> String {
        self.executable.sdl()
    }

    /// Executes a request with `context` attached as request data.
    pub async fn execute(
        &self,
        request: impl Into<async_graphql::Request>,
        context: GraphQLContext,
    ) -> async_graphql::Response {
        self.executable.execute(request.into().data(context)).await
    }
}

impl std::fmt::Debug for SynthesizedSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedSchema")
            .field("types", &self.model.types.len())
            .field("query", &self.model.query)
            .field("mutation", &self.model.mutation)
            .field("subscription", &self.model.subscription)
            .finish()
    }
}

/// Applies the `enabledForClasses` / `disabledForClasses` filters.
///
/// A class named in both lists is excluded.
pub fn select_classes<'a>(all: &'a [ClassSchema], config: &GraphQLConfig) -> Vec<&'a ClassSchema> {
    let enabled = config.enabled_for_classes.as_deref();
    let disabled = config.disabled_for_classes.as_deref();
    all.iter()
        .filter(|class| enabled.is_none_or(|names| names.contains(&class.class_name)))
        .filter(|class| disabled.is_none_or(|names| !names.contains(&class.class_name)))
        .collect()
}

/// Orders classes with `_`-prefixed system classes first, then by name.
fn canonical_class_order(classes: &mut [&ClassSchema]) {
    classes.sort_by(|a, b| {
        (!a.is_reserved(), &a.class_name).cmp(&(!b.is_reserved(), &b.class_name))
    });
}

/// Copy of `class` with sorted fields and, for `_User`, no auth data columns.
fn prepare_class(class: &ClassSchema) -> ClassSchema {
    let mut fields: IndexMap<_, _> = class
        .fields
        .iter()
        .filter(|(name, _)| {
            class.class_name != USER_CLASS || !name.starts_with(AUTH_DATA_PREFIX)
        })
        .map(|(name, ty)| (name.clone(), ty.clone()))
        .collect();
    fields.sort_keys();
    ClassSchema {
        class_name: class.class_name.clone(),
        fields,
    }
}

/// Builds and caches the schema for the classes of one application.
pub struct ClassSchemaBuilder {
    db: DynDatabase,
    functions: DynCloudFunctions,
    config_store: ConfigStore,
    settings: GraphQLSettings,
    custom_schema: Option<CustomSchema>,
    loaders: Vec<DynClassLoader>,

    /// Serializes `load()`. Also owns the warn-once table shared by builds.
    build_lock: Mutex<WarnOnce>,

    /// The current schema and the fingerprint it was built from.
    state: RwLock<Option<(Arc<SynthesizedSchema>, Fingerprint)>>,

    is_users_class_disabled: AtomicBool,
}

impl ClassSchemaBuilder {
    pub fn builder() -> ClassSchemaBuilderBuilder {
        ClassSchemaBuilderBuilder::default()
    }

    /// Returns the schema for the current inputs, rebuilding it if any of
    /// them changed since the last successful build.
    ///
    /// Concurrent calls are serialized. A failed build leaves the previous
    /// schema in place.
    ///
    /// # Errors
    ///
    /// Returns the upstream error if classes, config or function names
    /// cannot be fetched, or the error of a loader, a root type collision,
    /// the custom schema merge or the executable schema build.
    pub async fn load(&self) -> Result<Arc<SynthesizedSchema>, GraphQLError> {
        let mut warnings = self.build_lock.lock().await;

        let (controller, config) = tokio::try_join!(
            async { self.db.load_schema().await.map_err(GraphQLError::from) },
            self.config_store.get(),
        )?;
        let classes = controller.all_classes();
        let function_names = self.valid_function_names(&mut warnings).await?;

        let fingerprint = Fingerprint::new(&classes, &config, &function_names);
        {
            let state = self.state.read().await;
            if let Some((schema, previous)) = state.as_ref()
                && !should_rebuild(Some(previous), &fingerprint)
            {
                debug!("GraphQL schema inputs unchanged");
                return Ok(Arc::clone(schema));
            }
        }

        info!(classes = classes.len(), "Building GraphQL schema");
        let (schema, is_users_class_disabled) =
            self.build(&classes, &config, function_names, &mut warnings)?;
        let schema = Arc::new(schema);

        *self.state.write().await = Some((Arc::clone(&schema), fingerprint));
        self.is_users_class_disabled
            .store(is_users_class_disabled, Ordering::Release);

        info!(
            types = schema.model.types.len(),
            queries = schema.model.query_fields().map_or(0, IndexMap::len),
            mutations = schema.model.mutation_fields().map_or(0, IndexMap::len),
            "GraphQL schema built"
        );
        Ok(schema)
    }

    async fn valid_function_names(
        &self,
        warnings: &mut WarnOnce,
    ) -> Result<Vec<String>, GraphQLError> {
        let names = self.functions.function_names(&self.settings.app_id).await?;
        Ok(names
            .into_iter()
            .filter(|name| {
                let valid = is_valid_graphql_name(name);
                if !valid {
                    warnings.warn(&format!(
                        "Function {name} could not be added to the auto schema because GraphQL names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/."
                    ));
                }
                valid
            })
            .collect())
    }

    fn build(
        &self,
        classes: &[ClassSchema],
        config: &GraphQLConfig,
        function_names: Vec<String>,
        warnings: &mut WarnOnce,
    ) -> Result<(SynthesizedSchema, bool), GraphQLError> {
        let mut selected = select_classes(classes, config);
        canonical_class_order(&mut selected);

        let mut build = SchemaBuild::new(warnings);
        build.select_classes(selected.iter().copied());
        build.set_function_names(function_names);
        load_scaffolding(&mut build)?;

        for class in selected {
            let class = prepare_class(class);
            let class_config = config.class_config(&class.class_name);
            for loader in &self.loaders {
                trace!(class_name = %class.class_name, loader = loader.name(), "Loading class");
                loader.load(&mut build, &class, class_config)?;
            }
        }

        load_trailing_defaults(&mut build)?;
        let is_users_class_disabled = build.is_users_class_disabled();
        let auto_schema = build.finish()?;

        let model = match &self.custom_schema {
            Some(custom) => custom.merge(auto_schema, warnings)?,
            None => auto_schema,
        };
        let executable = model.to_executable::<()>(&self.settings, None)?;

        Ok((SynthesizedSchema { model, executable }, is_users_class_disabled))
    }

    /// The last successfully built schema, without triggering a build.
    pub async fn current(&self) -> Option<Arc<SynthesizedSchema>> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|(schema, _)| Arc::clone(schema))
    }

    /// Store used to read and edit the persisted GraphQL config.
    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn settings(&self) -> &GraphQLSettings {
        &self.settings
    }

    /// Whether `_User` was filtered out by the last successful build.
    pub fn is_users_class_disabled(&self) -> bool {
        self.is_users_class_disabled.load(Ordering::Acquire)
    }

    /// Request context backed by this builder's collaborators.
    pub fn context(&self, request_id: impl Into<String>) -> GraphQLContext {
        GraphQLContext {
            db: Arc::clone(&self.db),
            functions: Arc::clone(&self.functions),
            app_id: self.settings.app_id.clone(),
            user: None,
            request_id: request_id.into(),
        }
    }
}

/// Fluent constructor for [`ClassSchemaBuilder`].
#[derive(Default)]
pub struct ClassSchemaBuilderBuilder {
    db: Option<DynDatabase>,
    functions: Option<DynCloudFunctions>,
    cache: Option<DynCache>,
    settings: Option<GraphQLSettings>,
    custom_schema: Option<CustomSchema>,
    loaders: Option<Vec<DynClassLoader>>,
}

impl ClassSchemaBuilderBuilder {
    pub fn with_database(mut self, db: DynDatabase) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_functions(mut self, functions: DynCloudFunctions) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Cache for the persisted config. Ignored unless `cache_config` is set.
    pub fn with_cache(mut self, cache: DynCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_settings(mut self, settings: GraphQLSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_custom_schema(mut self, custom_schema: CustomSchema) -> Self {
        self.custom_schema = Some(custom_schema);
        self
    }

    /// Appends a loader after the default ones.
    pub fn with_loader(mut self, loader: DynClassLoader) -> Self {
        self.loaders.get_or_insert_with(default_loaders).push(loader);
        self
    }

    /// Replaces the per-class loaders.
    pub fn with_loaders(mut self, loaders: Vec<DynClassLoader>) -> Self {
        self.loaders = Some(loaders);
        self
    }

    /// Builds the [`ClassSchemaBuilder`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::InvalidSettings`] if a collaborator is
    /// missing or the settings do not validate.
    pub fn build(self) -> Result<ClassSchemaBuilder, GraphQLError> {
        let db = self
            .db
            .ok_or_else(|| GraphQLError::InvalidSettings("a database is required".into()))?;
        let functions = self.functions.ok_or_else(|| {
            GraphQLError::InvalidSettings("a cloud functions adapter is required".into())
        })?;
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let cache = self.cache.filter(|_| settings.cache_config);
        Ok(ClassSchemaBuilder {
            config_store: ConfigStore::new(Arc::clone(&db), cache),
            db,
            functions,
            settings,
            custom_schema: self.custom_schema,
            loaders: self.loaders.unwrap_or_else(default_loaders),
            build_lock: Mutex::new(WarnOnce::new()),
            state: RwLock::new(None),
            is_users_class_disabled: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use strata_storage::FieldType;

    use super::*;

    fn classes() -> Vec<ClassSchema> {
        vec![
            ClassSchema::new("Car"),
            ClassSchema::new("_User"),
            ClassSchema::new("Boat"),
            ClassSchema::new("_Role"),
        ]
    }

    fn names(selected: &[&ClassSchema]) -> Vec<String> {
        selected.iter().map(|c| c.class_name.clone()).collect()
    }

    #[test]
    fn test_select_without_filters_keeps_all() {
        let all = classes();
        assert_eq!(select_classes(&all, &GraphQLConfig::default()).len(), 4);
    }

    #[test]
    fn test_disabled_wins_over_enabled() {
        let all = classes();
        let config = GraphQLConfig {
            enabled_for_classes: Some(vec!["Car".into(), "Boat".into()]),
            disabled_for_classes: Some(vec!["Boat".into()]),
            class_configs: None,
        };
        assert_eq!(names(&select_classes(&all, &config)), vec!["Car"]);
    }

    #[test]
    fn test_disabled_only_removes() {
        let all = classes();
        let config = GraphQLConfig {
            disabled_for_classes: Some(vec!["_User".into()]),
            ..GraphQLConfig::default()
        };
        assert_eq!(names(&select_classes(&all, &config)), vec!["Car", "Boat", "_Role"]);
    }

    #[test]
    fn test_canonical_order_puts_system_classes_first() {
        let all = classes();
        let mut selected: Vec<&ClassSchema> = all.iter().collect();
        canonical_class_order(&mut selected);
        assert_eq!(names(&selected), vec!["_Role", "_User", "Boat", "Car"]);
    }

    #[test]
    fn test_prepare_class_strips_auth_data_and_sorts() {
        let user = ClassSchema::new(USER_CLASS)
            .with_field("username", FieldType::String)
            .with_field("_auth_data_github", FieldType::Object)
            .with_field("email", FieldType::String);
        let prepared = prepare_class(&user);
        let fields: Vec<&str> = prepared.fields.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["email", "username"]);

        let other = ClassSchema::new("Car").with_field("_auth_data_x", FieldType::String);
        assert!(prepare_class(&other).fields.contains_key("_auth_data_x"));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = ClassSchemaBuilder::builder().build();
        assert!(matches!(result, Err(GraphQLError::InvalidSettings(_))));
    }
}
