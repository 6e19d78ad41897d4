use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use strata_graphql::GraphQLSettings;
use strata_storage::ClassSchema;

/// The parts of `strata.toml` the CLI reads.
#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    #[serde(default)]
    graphql: GraphQLSettings,
}

pub fn load_settings(path: Option<&Path>) -> Result<GraphQLSettings> {
    let Some(path) = path else {
        return Ok(GraphQLSettings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read settings file {}", path.display()))?;
    let file: SettingsFile = toml::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    Ok(file.graphql)
}

pub fn load_classes(path: Option<&Path>) -> Result<Vec<ClassSchema>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let classes = serde_json::from_value(load_json(path)?)
        .with_context(|| format!("Invalid class definitions in {}", path.display()))?;
    Ok(classes)
}

pub fn load_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub fn load_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}
