//! Validation of GraphQL config updates.
//!
//! Validation works on raw JSON rather than on the typed model so that
//! unknown keys and wrongly typed values can be reported individually.
//! Every violation is collected; nothing stops at the first error.

use serde_json::{Map, Value};
use strata_storage::USER_CLASS;

use crate::error::GraphQLError;

const CONFIG_KEYS: &[&str] = &["enabledForClasses", "disabledForClasses", "classConfigs"];
const CLASS_CONFIG_KEYS: &[&str] = &["className", "type", "query", "mutation"];
const TYPE_KEYS: &[&str] = &["inputFields", "outputFields", "constraintFields", "sortFields"];
const INPUT_FIELD_KEYS: &[&str] = &["create", "update"];
const SORT_FIELD_KEYS: &[&str] = &["field", "asc", "desc"];
const QUERY_KEYS: &[&str] = &["get", "find", "getAlias", "findAlias"];
const MUTATION_KEYS: &[&str] = &[
    "create",
    "update",
    "destroy",
    "createAlias",
    "updateAlias",
    "destroyAlias",
];

/// Fields the user class must accept on create.
const USER_CREATE_REQUIRED: &[&str] = &["username", "password"];

/// Validates a (partial) GraphQL config document.
///
/// # Errors
///
/// Returns [`GraphQLError::InvalidConfig`] listing every violation found.
pub fn validate_graphql_config(config: &Value) -> Result<(), GraphQLError> {
    let mut errors = Vec::new();

    let Value::Object(config) = config else {
        return Err(GraphQLError::InvalidConfig(vec![
            "must be a valid object".into(),
        ]));
    };

    let invalid = invalid_keys(config, CONFIG_KEYS);
    if !invalid.is_empty() {
        errors.push(format!("encountered invalid keys: [{}]", invalid.join(", ")));
    }

    for key in ["enabledForClasses", "disabledForClasses"] {
        if let Some(value) = config.get(key) {
            if !is_class_name_list(value) {
                errors.push(format!("property \"{key}\" must be an array of strings"));
            }
        }
    }

    if let Some(class_configs) = config.get("classConfigs") {
        match class_configs {
            Value::Array(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    validate_class_config(index, entry, &mut errors);
                }
            }
            _ => errors.push("property \"classConfigs\" must be an array".into()),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GraphQLError::InvalidConfig(errors))
    }
}

fn validate_class_config(index: usize, entry: &Value, errors: &mut Vec<String>) {
    let Value::Object(entry) = entry else {
        errors.push(format!("classConfigs[{index}] must be a valid object"));
        return;
    };

    let class_name = entry
        .get("className")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty());
    let label = match class_name {
        Some(name) => format!("classConfig:{name}"),
        None => format!("classConfigs[{index}]"),
    };

    let mut problems = Vec::new();
    if class_name.is_none() {
        problems.push("\"className\" must be a valid string".to_string());
    }

    let invalid = invalid_keys(entry, CLASS_CONFIG_KEYS);
    if !invalid.is_empty() {
        problems.push(format!("encountered invalid keys: [{}]", invalid.join(", ")));
    }

    if let Some(type_config) = entry.get("type") {
        validate_type_config(class_name.unwrap_or_default(), type_config, &mut problems);
    }
    if let Some(query) = entry.get("query") {
        validate_toggles("query", query, QUERY_KEYS, &mut problems);
    }
    if let Some(mutation) = entry.get("mutation") {
        validate_toggles("mutation", mutation, MUTATION_KEYS, &mut problems);
    }

    errors.extend(
        problems
            .into_iter()
            .map(|problem| format!("{label} is invalid because {problem}")),
    );
}

fn validate_type_config(class_name: &str, value: &Value, problems: &mut Vec<String>) {
    let Value::Object(type_config) = value else {
        problems.push("\"type\" must be a valid object".into());
        return;
    };

    let invalid = invalid_keys(type_config, TYPE_KEYS);
    if !invalid.is_empty() {
        problems.push(format!("\"type\" contains invalid keys: [{}]", invalid.join(", ")));
    }

    for key in ["outputFields", "constraintFields"] {
        if let Some(value) = type_config.get(key) {
            if !is_string_list(value) {
                problems.push(format!("\"{key}\" must be an array of strings"));
            }
        }
    }

    if let Some(sort_fields) = type_config.get("sortFields") {
        match sort_fields {
            Value::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if !is_sort_field(entry) {
                        problems.push(format!(
                            "\"sortFields\" entry {i} must be an object with keys field (string), asc (boolean) and desc (boolean)"
                        ));
                    }
                }
            }
            _ => problems.push("\"sortFields\" must be an array".into()),
        }
    }

    if let Some(input_fields) = type_config.get("inputFields") {
        validate_input_fields(class_name, input_fields, problems);
    }
}

fn validate_input_fields(class_name: &str, value: &Value, problems: &mut Vec<String>) {
    let Value::Object(input_fields) = value else {
        problems.push("\"inputFields\" must be a valid object".into());
        return;
    };

    let invalid = invalid_keys(input_fields, INPUT_FIELD_KEYS);
    if !invalid.is_empty() {
        problems.push(format!(
            "\"inputFields\" contains invalid keys: [{}]",
            invalid.join(", ")
        ));
    }

    for key in INPUT_FIELD_KEYS {
        let Some(value) = input_fields.get(*key) else {
            continue;
        };
        if !is_string_list(value) {
            problems.push(format!("\"inputFields.{key}\" must be an array of strings"));
            continue;
        }
        if *key == "create" && class_name == USER_CLASS {
            let has_required = USER_CREATE_REQUIRED
                .iter()
                .all(|required| value.as_array().is_some_and(|v| v.iter().any(|f| f == required)));
            if !has_required {
                problems.push(format!(
                    "\"inputFields.create\" must include required fields, {}",
                    USER_CREATE_REQUIRED.join(" and ")
                ));
            }
        }
    }
}

/// Validates a `query` or `mutation` block: booleans plus `*Alias` strings.
fn validate_toggles(section: &str, value: &Value, allowed: &[&str], problems: &mut Vec<String>) {
    let Value::Object(toggles) = value else {
        problems.push(format!("\"{section}\" must be a valid object"));
        return;
    };

    let invalid = invalid_keys(toggles, allowed);
    if !invalid.is_empty() {
        problems.push(format!(
            "\"{section}\" contains invalid keys: [{}]",
            invalid.join(", ")
        ));
    }

    for key in allowed {
        let Some(value) = toggles.get(*key) else {
            continue;
        };
        if key.ends_with("Alias") {
            if !value.is_string() {
                problems.push(format!("\"{section}.{key}\" must be a string"));
            }
        } else if !value.is_boolean() {
            problems.push(format!("\"{section}.{key}\" must be a boolean"));
        }
    }
}

fn invalid_keys<'a>(object: &'a Map<String, Value>, allowed: &[&str]) -> Vec<&'a str> {
    object
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect()
}

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn is_class_name_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| {
        items
            .iter()
            .all(|item| item.as_str().is_some_and(|name| !name.trim().is_empty()))
    })
}

fn is_sort_field(value: &Value) -> bool {
    let Value::Object(entry) = value else {
        return false;
    };
    invalid_keys(entry, SORT_FIELD_KEYS).is_empty()
        && entry.get("field").is_some_and(Value::is_string)
        && entry.get("asc").is_some_and(Value::is_boolean)
        && entry.get("desc").is_some_and(Value::is_boolean)
}
