//! Configuration.
//!
//! - [`GraphQLSettings`] - static engine settings (TOML)
//! - [`GraphQLConfig`] - the persisted, runtime-editable generation config
//! - [`ConfigStore`] - validated, cached persistence for [`GraphQLConfig`]

mod model;
mod settings;
mod store;
mod validate;

pub use model::{
    ClassConfig, GraphQLConfig, InputFields, MutationConfig, QueryConfig, SortField, TypeConfig,
};
pub use settings::GraphQLSettings;
pub use store::{
    CONFIG_CACHE_KEY, CONFIG_CACHE_TTL, ConfigAck, ConfigStore, GRAPHQL_CONFIG_CLASS,
    GRAPHQL_CONFIG_FIELD, GRAPHQL_CONFIG_ID,
};
pub use validate::validate_graphql_config;
