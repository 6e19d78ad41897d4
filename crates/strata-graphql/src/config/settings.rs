//! Engine settings.
//!
//! Static settings for the schema builder, usually read from the `[graphql]`
//! section of `strata.toml`. These are fixed for the lifetime of a builder;
//! the per-class generation config lives in [`GraphQLConfig`](super::GraphQLConfig)
//! and can change at runtime.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! app_id = "my-app"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! cache_config = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GraphQLError;

/// Schema builder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLSettings {
    /// Application id passed to the cloud function collaborator.
    /// Default: "strata"
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Cache the persisted GraphQL config between reads.
    /// A cache adapter handed to the builder is ignored when false.
    /// Default: true
    #[serde(default = "default_cache_config")]
    pub cache_config: bool,
}

fn default_app_id() -> String {
    "strata".to_string()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_cache_config() -> bool {
    true
}

impl Default for GraphQLSettings {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            cache_config: default_cache_config(),
        }
    }
}

impl GraphQLSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is zero or the app id is blank.
    pub fn validate(&self) -> Result<(), GraphQLError> {
        if self.app_id.trim().is_empty() {
            return Err(GraphQLError::InvalidSettings(
                "graphql.app_id must not be empty".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(GraphQLError::InvalidSettings(
                "graphql.max_depth must be > 0".into(),
            ));
        }
        if self.max_complexity == 0 {
            return Err(GraphQLError::InvalidSettings(
                "graphql.max_complexity must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GraphQLSettings::default();
        assert_eq!(settings.app_id, "strata");
        assert_eq!(settings.max_depth, 15);
        assert_eq!(settings.max_complexity, 500);
        assert!(settings.introspection);
        assert!(settings.cache_config);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_limits() {
        let mut settings = GraphQLSettings::default();
        settings.max_depth = 0;
        assert!(settings.validate().is_err());

        let mut settings = GraphQLSettings::default();
        settings.max_complexity = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_app_id() {
        let settings = GraphQLSettings {
            app_id: "  ".into(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidSettings(_)));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            app_id = "cars"
            max_depth = 20
            introspection = false
        "#;

        let settings: GraphQLSettings = toml::from_str(toml).unwrap();
        assert_eq!(settings.app_id, "cars");
        assert_eq!(settings.max_depth, 20);
        assert_eq!(settings.max_complexity, 500);
        assert!(!settings.introspection);
        assert!(settings.cache_config);
    }
}
