//! Rebuild gate.
//!
//! A [`Fingerprint`] captures every input a build depends on. Two builds
//! with equal fingerprints produce equivalent schemas, so the cached schema
//! is reused.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use strata_storage::{ClassSchema, FieldType};

use crate::config::GraphQLConfig;

/// The inputs of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Field map per class name.
    pub classes: BTreeMap<String, IndexMap<String, FieldType>>,
    pub config: GraphQLConfig,
    /// Valid function names joined with `,`.
    pub function_names: String,
}

impl Fingerprint {
    pub fn new(classes: &[ClassSchema], config: &GraphQLConfig, function_names: &[String]) -> Self {
        Self {
            classes: classes
                .iter()
                .map(|class| (class.class_name.clone(), class.fields.clone()))
                .collect(),
            config: config.clone(),
            function_names: function_names.join(","),
        }
    }
}

/// Returns `true` unless `previous` exists and equals `next`.
pub fn should_rebuild(previous: Option<&Fingerprint>, next: &Fingerprint) -> bool {
    previous != Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<ClassSchema> {
        vec![
            ClassSchema::new("Car")
                .with_field("name", FieldType::String)
                .with_field("wheels", FieldType::Number),
            ClassSchema::new("_User").with_field("username", FieldType::String),
        ]
    }

    #[test]
    fn test_first_build_always_rebuilds() {
        let next = Fingerprint::new(&classes(), &GraphQLConfig::default(), &[]);
        assert!(should_rebuild(None, &next));
    }

    #[test]
    fn test_equal_inputs_skip_rebuild() {
        let prev = Fingerprint::new(&classes(), &GraphQLConfig::default(), &["hello".into()]);
        let next = Fingerprint::new(&classes(), &GraphQLConfig::default(), &["hello".into()]);
        assert!(!should_rebuild(Some(&prev), &next));
    }

    #[test]
    fn test_class_and_field_order_do_not_matter() {
        let mut reordered = classes();
        reordered.reverse();
        reordered[1] = ClassSchema::new("Car")
            .with_field("wheels", FieldType::Number)
            .with_field("name", FieldType::String);

        let prev = Fingerprint::new(&classes(), &GraphQLConfig::default(), &[]);
        let next = Fingerprint::new(&reordered, &GraphQLConfig::default(), &[]);
        assert!(!should_rebuild(Some(&prev), &next));
    }

    #[test]
    fn test_each_input_triggers_rebuild() {
        let base = Fingerprint::new(&classes(), &GraphQLConfig::default(), &[]);

        let mut changed = classes();
        changed[0].fields.insert("color".into(), FieldType::String);
        let next = Fingerprint::new(&changed, &GraphQLConfig::default(), &[]);
        assert!(should_rebuild(Some(&base), &next));

        let config = GraphQLConfig {
            enabled_for_classes: Some(vec!["Car".into()]),
            ..Default::default()
        };
        let next = Fingerprint::new(&classes(), &config, &[]);
        assert!(should_rebuild(Some(&base), &next));

        let next = Fingerprint::new(&classes(), &GraphQLConfig::default(), &["hello".into()]);
        assert!(should_rebuild(Some(&base), &next));
    }
}
