//! In-memory cloud function registry.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Value, json};
use strata_storage::{CloudFunctions, StorageError};
use tracing::debug;

/// A registered function: receives the call parameters, returns its result.
pub type CloudFunction = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Cloud function registry keyed by function name.
///
/// A single registry serves every application id.
#[derive(Default)]
pub struct InMemoryFunctions {
    functions: DashMap<String, CloudFunction>,
}

impl InMemoryFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a function.
    pub fn define<F>(&self, name: impl Into<String>, function: F)
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Removes a function. Returns `false` if it was not registered.
    pub fn undefine(&self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }
}

impl std::fmt::Debug for InMemoryFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFunctions")
            .field("count", &self.functions.len())
            .finish()
    }
}

#[async_trait]
impl CloudFunctions for InMemoryFunctions {
    async fn function_names(&self, _app_id: &str) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self
            .functions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn call(&self, app_id: &str, name: &str, params: Value) -> Result<Value, StorageError> {
        let function = self
            .functions
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StorageError::function(name, "function not found"))?;

        debug!(app_id, function = name, "Running cloud function");
        let result = function(params).map_err(|message| StorageError::function(name, message))?;
        Ok(json!({ "response": { "result": result } }))
    }
}
