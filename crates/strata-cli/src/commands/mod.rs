pub mod config;
pub mod query;
pub mod schema;

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use strata_db_memory::{InMemoryDatabase, InMemoryFunctions, MokaCache};
use strata_graphql::{ClassSchemaBuilder, CustomSchema};
use tracing::debug;

use crate::cli::Cli;

/// Builds a schema builder over an in-memory backend seeded from the
/// command line inputs.
pub async fn make_builder(cli: &Cli) -> Result<ClassSchemaBuilder> {
    let settings = crate::config::load_settings(cli.settings.as_deref())?;
    let classes = crate::config::load_classes(cli.classes.as_deref())?;
    debug!(classes = classes.len(), "Loaded class definitions");

    let functions = InMemoryFunctions::new();
    for name in &cli.functions {
        functions.define(name.clone(), |params: Value| Ok(params));
    }

    let mut builder = ClassSchemaBuilder::builder()
        .with_database(Arc::new(InMemoryDatabase::with_classes(classes)))
        .with_functions(Arc::new(functions))
        .with_cache(Arc::new(MokaCache::new()))
        .with_settings(settings);
    if let Some(path) = &cli.typedefs {
        let sdl = crate::config::load_text(path)?;
        builder = builder.with_custom_schema(CustomSchema::from_sdl(&sdl)?);
    }
    let builder = builder.build()?;

    if let Some(path) = &cli.config {
        builder
            .config_store()
            .set(crate::config::load_json(path)?)
            .await?;
    }
    Ok(builder)
}
