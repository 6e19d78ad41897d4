//! The persisted GraphQL config.
//!
//! Every field is optional and absent fields are not serialized, so a config
//! read back from storage serializes to exactly what was written.

use serde::{Deserialize, Serialize};

/// Which classes get GraphQL types, plus per-class toggles and aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_for_classes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_for_classes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_configs: Option<Vec<ClassConfig>>,
}

impl GraphQLConfig {
    /// Returns the config entry for a class, if one exists.
    #[must_use]
    pub fn class_config(&self, class_name: &str) -> Option<&ClassConfig> {
        self.class_configs
            .as_ref()?
            .iter()
            .find(|c| c.class_name == class_name)
    }
}

/// Generation toggles for a single class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassConfig {
    pub class_name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_config: Option<TypeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<MutationConfig>,
}

impl ClassConfig {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            type_config: None,
            query: None,
            mutation: None,
        }
    }
}

/// Restricts the fields exposed by the generated types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_fields: Option<InputFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_fields: Option<Vec<SortField>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Vec<String>>,
}

/// A sortable field and the directions it may be sorted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub asc: bool,
    pub desc: bool,
}

/// Toggles and aliases for the generated `get`/`find` queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_alias: Option<String>,
}

/// Toggles and aliases for the generated create/update/delete mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroy_alias: Option<String>,
}
