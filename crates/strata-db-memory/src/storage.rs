use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use strata_storage::{
    ClassSchema, Database, FindQuery, FindResult, SchemaController, StorageError,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use tracing::trace;

use crate::query::{apply_update, matches, sort};

pub type StorageKey = String; // Format: "ClassName/objectId"

pub(crate) fn make_storage_key(class_name: &str, object_id: &str) -> StorageKey {
    format!("{class_name}/{object_id}")
}

/// In-memory database backend.
///
/// Objects live in a `DashMap` keyed by `ClassName/objectId`; class
/// definitions are replaced wholesale through [`InMemoryDatabase::set_classes`]
/// or edited one at a time, which is how tests simulate live schema changes.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    classes: RwLock<Vec<ClassSchema>>,
    objects: Arc<DashMap<StorageKey, Value>>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database with the given classes.
    pub fn with_classes(classes: Vec<ClassSchema>) -> Self {
        Self {
            classes: RwLock::new(classes),
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Replaces every class definition.
    pub async fn set_classes(&self, classes: Vec<ClassSchema>) {
        *self.classes.write().await = classes;
    }

    /// Adds a class, or replaces the class with the same name.
    pub async fn put_class(&self, class: ClassSchema) {
        let mut classes = self.classes.write().await;
        match classes.iter_mut().find(|c| c.class_name == class.class_name) {
            Some(existing) => *existing = class,
            None => classes.push(class),
        }
    }

    /// Removes a class definition. Stored objects are kept.
    pub async fn drop_class(&self, class_name: &str) {
        self.classes
            .write()
            .await
            .retain(|c| c.class_name != class_name);
    }

    /// Returns the number of stored objects across all classes.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn objects_of(&self, class_name: &str) -> Vec<Value> {
        let prefix = format!("{class_name}/");
        self.objects
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

fn now_rfc3339() -> Result<String, StorageError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StorageError::internal(format!("failed to format timestamp: {e}")))
}

fn new_object_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn load_schema(&self) -> Result<SchemaController, StorageError> {
        Ok(SchemaController::new(self.classes.read().await.clone()))
    }

    async fn get(&self, class_name: &str, object_id: &str) -> Result<Option<Value>, StorageError> {
        let key = make_storage_key(class_name, object_id);
        Ok(self.objects.get(&key).map(|entry| entry.value().clone()))
    }

    async fn find(&self, class_name: &str, query: &FindQuery) -> Result<FindResult, StorageError> {
        let mut results: Vec<Value> = self
            .objects_of(class_name)
            .into_iter()
            .filter(|object| matches(object, query))
            .collect();

        if query.order.is_empty() {
            // Stable default order so pages don't shuffle between calls.
            results.sort_by(|a, b| {
                let a = a.get("objectId").and_then(Value::as_str).unwrap_or_default();
                let b = b.get("objectId").and_then(Value::as_str).unwrap_or_default();
                a.cmp(b)
            });
        } else {
            sort(&mut results, &query.order);
        }

        let count = results.len();
        let page: Vec<Value> = results
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        trace!(class_name, count, returned = page.len(), "find");
        Ok(FindResult {
            results: page,
            count,
        })
    }

    async fn create(
        &self,
        class_name: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Value, StorageError> {
        let object_id = match fields.get("objectId").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => new_object_id(),
        };
        let key = make_storage_key(class_name, &object_id);
        if self.objects.contains_key(&key) {
            return Err(StorageError::invalid_query(format!(
                "object {key} already exists"
            )));
        }

        let now = now_rfc3339()?;
        fields.insert("objectId".into(), Value::String(object_id));
        fields.insert("createdAt".into(), Value::String(now.clone()));
        fields.insert("updatedAt".into(), Value::String(now));

        let object = Value::Object(fields);
        self.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        class_name: &str,
        object_id: &str,
        update: Map<String, Value>,
        upsert: bool,
    ) -> Result<Value, StorageError> {
        let key = make_storage_key(class_name, object_id);
        let now = now_rfc3339()?;

        let mut entry = match self.objects.get_mut(&key) {
            Some(entry) => entry,
            None if upsert => {
                let mut fresh = Map::new();
                fresh.insert("objectId".into(), Value::String(object_id.to_string()));
                fresh.insert("createdAt".into(), Value::String(now.clone()));
                self.objects.entry(key.clone()).or_insert(Value::Object(fresh));
                self.objects
                    .get_mut(&key)
                    .ok_or_else(|| StorageError::internal(format!("lost upserted object {key}")))?
            }
            None => return Err(StorageError::not_found(class_name, object_id)),
        };

        let Value::Object(object) = entry.value_mut() else {
            return Err(StorageError::internal(format!("object {key} is not a map")));
        };
        apply_update(object, update);
        object.insert("updatedAt".into(), Value::String(now));
        Ok(entry.value().clone())
    }

    async fn destroy(&self, class_name: &str, object_id: &str) -> Result<bool, StorageError> {
        let key = make_storage_key(class_name, object_id);
        Ok(self.objects.remove(&key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_storage::FieldType;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_class_snapshot_reflects_edits() {
        let db = InMemoryDatabase::with_classes(vec![ClassSchema::new("Car")]);
        db.put_class(ClassSchema::new("Car").with_field("name", FieldType::String))
            .await;
        db.put_class(ClassSchema::new("Boat")).await;

        let schema = db.load_schema().await.unwrap();
        assert_eq!(schema.all_classes().len(), 2);
        assert_eq!(schema.get_class("Car").unwrap().fields.len(), 1);

        db.drop_class("Boat").await;
        assert!(db.load_schema().await.unwrap().get_class("Boat").is_none());
    }

    #[tokio::test]
    async fn test_create_get_destroy() {
        let db = InMemoryDatabase::new();
        let created = db.create("Car", fields(json!({"name": "A"}))).await.unwrap();
        let id = created["objectId"].as_str().unwrap().to_string();
        assert!(created.get("createdAt").is_some());

        let read = db.get("Car", &id).await.unwrap().unwrap();
        assert_eq!(read["name"], "A");

        assert!(db.destroy("Car", &id).await.unwrap());
        assert!(!db.destroy("Car", &id).await.unwrap());
        assert!(db.get("Car", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_without_upsert_fails_for_missing() {
        let db = InMemoryDatabase::new();
        let err = db
            .update("Car", "missing", fields(json!({"name": "B"})), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_upsert_nested_field() {
        let db = InMemoryDatabase::new();
        db.update(
            "_GraphQLConfig",
            "1",
            fields(json!({"config.enabledForClasses": ["Car"]})),
            true,
        )
        .await
        .unwrap();
        let stored = db
            .update(
                "_GraphQLConfig",
                "1",
                fields(json!({"config.disabledForClasses": []})),
                true,
            )
            .await
            .unwrap();

        assert_eq!(
            stored["config"],
            json!({"enabledForClasses": ["Car"], "disabledForClasses": []})
        );
        assert_eq!(stored["objectId"], "1");
    }

    #[tokio::test]
    async fn test_find_paginates_and_counts() {
        let db = InMemoryDatabase::new();
        for (id, color) in [("a", "red"), ("b", "blue"), ("c", "red"), ("d", "red")] {
            db.create("Car", fields(json!({"objectId": id, "color": color})))
                .await
                .unwrap();
        }

        let query = FindQuery::new()
            .with_constraint("color", json!("red"))
            .with_skip(1)
            .with_limit(1);
        let result = db.find("Car", &query).await.unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0]["objectId"], "c");
    }
}
