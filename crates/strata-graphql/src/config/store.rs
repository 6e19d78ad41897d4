//! Persistence for the GraphQL config.
//!
//! The config lives in a single record (`_GraphQLConfig/1`, nested field
//! `config`). Reads go through an optional TTL cache; writes validate the
//! partial update, upsert it with dotted keys so untouched keys survive, and
//! replace the cache entry with the merged result.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use strata_storage::{DynCache, DynDatabase};
use tracing::{debug, warn};

use super::model::GraphQLConfig;
use super::validate::validate_graphql_config;
use crate::error::GraphQLError;

/// Class holding the config record.
pub const GRAPHQL_CONFIG_CLASS: &str = "_GraphQLConfig";

/// Object id of the config record.
pub const GRAPHQL_CONFIG_ID: &str = "1";

/// Field of the config record holding the config document.
pub const GRAPHQL_CONFIG_FIELD: &str = "config";

/// Cache key of the config document.
pub const CONFIG_CACHE_KEY: &str = "config";

/// How long a cached config is served before storage is consulted again.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(60);

/// Acknowledgement returned by [`ConfigStore::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigAck {
    pub result: bool,
}

/// Reads and writes the persisted [`GraphQLConfig`].
///
/// Caching is enabled exactly when a cache adapter is supplied.
#[derive(Clone)]
pub struct ConfigStore {
    db: DynDatabase,
    cache: Option<DynCache>,
}

impl ConfigStore {
    pub fn new(db: DynDatabase, cache: Option<DynCache>) -> Self {
        Self { db, cache }
    }

    pub fn is_caching_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Returns the current config. A missing record yields the empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the stored document does not
    /// deserialize.
    pub async fn get(&self) -> Result<GraphQLConfig, GraphQLError> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(CONFIG_CACHE_KEY).await {
                match serde_json::from_value(cached) {
                    Ok(config) => {
                        debug!("GraphQL config served from cache");
                        return Ok(config);
                    }
                    Err(e) => warn!(error = %e, "Discarding unreadable cached GraphQL config"),
                }
            }
        }

        let document = self
            .db
            .get(GRAPHQL_CONFIG_CLASS, GRAPHQL_CONFIG_ID)
            .await?
            .and_then(|mut record| record.get_mut(GRAPHQL_CONFIG_FIELD).map(Value::take))
            .unwrap_or_else(|| Value::Object(Map::new()));

        let config = parse_config(document.clone())?;
        if let Some(cache) = &self.cache {
            cache.put(CONFIG_CACHE_KEY, document, CONFIG_CACHE_TTL).await;
        }
        Ok(config)
    }

    /// Validates `partial` and merges it into the persisted config.
    ///
    /// # Errors
    ///
    /// Returns [`GraphQLError::InvalidConfig`] if validation fails, or the
    /// storage error if the upsert fails.
    pub async fn set(&self, partial: Value) -> Result<ConfigAck, GraphQLError> {
        validate_graphql_config(&partial)?;
        let Value::Object(partial) = partial else {
            return Err(GraphQLError::InvalidConfig(vec![
                "must be a valid object".into(),
            ]));
        };

        let update: Map<String, Value> = partial
            .into_iter()
            .map(|(key, value)| (format!("{GRAPHQL_CONFIG_FIELD}.{key}"), value))
            .collect();

        let stored = self
            .db
            .update(GRAPHQL_CONFIG_CLASS, GRAPHQL_CONFIG_ID, update, true)
            .await?;

        if let Some(cache) = &self.cache {
            let merged = stored
                .get(GRAPHQL_CONFIG_FIELD)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            cache.put(CONFIG_CACHE_KEY, merged, CONFIG_CACHE_TTL).await;
        }

        debug!("GraphQL config updated");
        Ok(ConfigAck { result: true })
    }
}

fn parse_config(document: Value) -> Result<GraphQLConfig, GraphQLError> {
    serde_json::from_value(document)
        .map_err(|e| GraphQLError::InvalidConfig(vec![format!("stored config is unreadable: {e}")]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;
    use strata_storage::{CacheAdapter, Database};
    use tokio::sync::Mutex;

    use super::*;

    /// Records every cache call so tests can assert on cache traffic.
    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<Map<String, Value>>,
        gets: Mutex<usize>,
    }

    #[async_trait]
    impl CacheAdapter for RecordingCache {
        async fn get(&self, key: &str) -> Option<Value> {
            *self.gets.lock().await += 1;
            self.entries.lock().await.get(key).cloned()
        }

        async fn put(&self, key: &str, value: Value, _ttl: Duration) {
            self.entries.lock().await.insert(key.to_string(), value);
        }

        async fn delete(&self, key: &str) {
            self.entries.lock().await.remove(key);
        }
    }

    fn store(cache: Option<DynCache>) -> (Arc<strata_db_memory::InMemoryDatabase>, ConfigStore) {
        let db = Arc::new(strata_db_memory::InMemoryDatabase::new());
        let store = ConfigStore::new(db.clone(), cache);
        (db, store)
    }

    #[tokio::test]
    async fn test_missing_record_is_empty_config() {
        let (_, store) = store(None);
        assert!(!store.is_caching_enabled());
        assert_eq!(store.get().await.unwrap(), GraphQLConfig::default());
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let (_, store) = store(None);
        let raw = json!({
            "enabledForClasses": ["ClassA", "ClassB"],
            "disabledForClasses": [],
            "classConfigs": [{"className": "ClassA", "query": {"get": false}}]
        });

        let ack = store.set(raw.clone()).await.unwrap();
        assert_eq!(ack, ConfigAck { result: true });

        let config = store.get().await.unwrap();
        assert_eq!(serde_json::to_value(config).unwrap(), raw);
    }

    #[tokio::test]
    async fn test_partial_set_keeps_other_keys() {
        let (db, store) = store(None);
        store
            .set(json!({"enabledForClasses": ["Car"]}))
            .await
            .unwrap();
        store
            .set(json!({"disabledForClasses": ["Boat"]}))
            .await
            .unwrap();

        let config = store.get().await.unwrap();
        assert_eq!(config.enabled_for_classes, Some(vec!["Car".to_string()]));
        assert_eq!(config.disabled_for_classes, Some(vec!["Boat".to_string()]));

        let record = db.get(GRAPHQL_CONFIG_CLASS, GRAPHQL_CONFIG_ID).await.unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn test_invalid_set_is_rejected_and_not_persisted() {
        let (db, store) = store(None);
        let err = store
            .set(json!({"classConfigs": [{"className": "X", "query": {"getAlias": 1}}]}))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphQLError::InvalidConfig(_)));
        assert_eq!(db.object_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_is_used_and_replaced() {
        let cache = Arc::new(RecordingCache::default());
        let (db, store) = store(Some(cache.clone()));
        assert!(store.is_caching_enabled());

        store
            .set(json!({"enabledForClasses": ["Car"]}))
            .await
            .unwrap();
        assert_eq!(
            cache.entries.lock().await.get(CONFIG_CACHE_KEY),
            Some(&json!({"enabledForClasses": ["Car"]}))
        );

        // Change storage behind the store's back; the cache still wins.
        db.update(
            GRAPHQL_CONFIG_CLASS,
            GRAPHQL_CONFIG_ID,
            Map::from_iter([("config.enabledForClasses".to_string(), json!(["Boat"]))]),
            false,
        )
        .await
        .unwrap();
        let config = store.get().await.unwrap();
        assert_eq!(config.enabled_for_classes, Some(vec!["Car".to_string()]));

        store
            .set(json!({"disabledForClasses": ["Car"]}))
            .await
            .unwrap();
        let config = store.get().await.unwrap();
        assert_eq!(config.enabled_for_classes, Some(vec!["Boat".to_string()]));
        assert_eq!(config.disabled_for_classes, Some(vec!["Car".to_string()]));
    }

    #[tokio::test]
    async fn test_get_populates_cache() {
        let cache = Arc::new(RecordingCache::default());
        let (db, store) = store(Some(cache.clone()));
        db.update(
            GRAPHQL_CONFIG_CLASS,
            GRAPHQL_CONFIG_ID,
            Map::from_iter([("config.enabledForClasses".to_string(), json!(["Car"]))]),
            true,
        )
        .await
        .unwrap();

        store.get().await.unwrap();
        assert!(cache.entries.lock().await.contains_key(CONFIG_CACHE_KEY));
        assert_eq!(*cache.gets.lock().await, 1);
    }
}
