//! Data types shared between the storage collaborators and the GraphQL engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The class holding authenticated users.
pub const USER_CLASS: &str = "_User";

/// Prefix marking system classes (`_User`, `_Role`, `_Session`, ...).
pub const RESERVED_CLASS_PREFIX: &str = "_";

/// Prefix of the per-provider auth data columns stored on `_User`.
pub const AUTH_DATA_PREFIX: &str = "_auth_data_";

/// Field names every stored object carries regardless of its class schema.
pub const DEFAULT_FIELDS: &[&str] = &["objectId", "createdAt", "updatedAt", "ACL"];

/// The type of a single class field.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type": "Pointer", "targetClass": "_User"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
    Pointer {
        #[serde(rename = "targetClass")]
        target_class: String,
    },
    Relation {
        #[serde(rename = "targetClass")]
        target_class: String,
    },
    File,
    GeoPoint,
    Polygon,
    Bytes,
    #[serde(rename = "ACL")]
    Acl,
}

impl FieldType {
    /// Returns the target class of a pointer or relation field.
    #[must_use]
    pub fn target_class(&self) -> Option<&str> {
        match self {
            Self::Pointer { target_class } | Self::Relation { target_class } => {
                Some(target_class.as_str())
            }
            _ => None,
        }
    }
}

/// A database class definition.
///
/// Field equality is order-insensitive, so two snapshots of the same class
/// compare equal even if the backend returned the fields in another order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchema {
    /// The class name (e.g., "_User", "Car").
    pub class_name: String,
    /// Field definitions keyed by field name.
    #[serde(default)]
    pub fields: IndexMap<String, FieldType>,
}

impl ClassSchema {
    /// Creates a class without fields.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field definition.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Returns `true` for system classes such as `_User`.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.class_name.starts_with(RESERVED_CLASS_PREFIX)
    }
}

/// Snapshot of all class definitions at the time `load_schema` was called.
#[derive(Debug, Clone, Default)]
pub struct SchemaController {
    classes: Vec<ClassSchema>,
}

impl SchemaController {
    /// Creates a controller over the given classes.
    #[must_use]
    pub fn new(classes: Vec<ClassSchema>) -> Self {
        Self { classes }
    }

    /// Returns every class known to the database.
    #[must_use]
    pub fn all_classes(&self) -> Vec<ClassSchema> {
        self.classes.clone()
    }

    /// Looks up a single class by name.
    #[must_use]
    pub fn get_class(&self, class_name: &str) -> Option<&ClassSchema> {
        self.classes.iter().find(|c| c.class_name == class_name)
    }
}

/// A sort key for [`FindQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// Parameters for a `find` call.
///
/// Constraints are equality matches on top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    /// Field equality constraints.
    pub constraints: Map<String, Value>,
    /// Sort order, applied left to right.
    pub order: Vec<SortKey>,
    /// Number of matching objects to skip.
    pub skip: usize,
    /// Maximum number of objects to return.
    pub limit: Option<usize>,
}

impl FindQuery {
    /// Creates an unconstrained query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality constraint.
    #[must_use]
    pub fn with_constraint(mut self, field: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(field.into(), value);
        self
    }

    /// Replaces all constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Map<String, Value>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Appends a sort key.
    #[must_use]
    pub fn with_order(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order.push(SortKey {
            field: field.into(),
            ascending,
        });
        self
    }

    /// Sets the number of objects to skip.
    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the maximum number of objects returned.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of a `find` call.
#[derive(Debug, Clone, Default)]
pub struct FindResult {
    /// The matching objects for the requested page.
    pub results: Vec<Value>,
    /// Total number of objects matching the constraints, ignoring skip/limit.
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_serde() {
        let pointer: FieldType =
            serde_json::from_value(json!({"type": "Pointer", "targetClass": "_User"})).unwrap();
        assert_eq!(pointer.target_class(), Some("_User"));

        let acl: FieldType = serde_json::from_value(json!({"type": "ACL"})).unwrap();
        assert_eq!(acl, FieldType::Acl);
        assert_eq!(serde_json::to_value(FieldType::Number).unwrap(), json!({"type": "Number"}));
    }

    #[test]
    fn test_class_equality_ignores_field_order() {
        let a = ClassSchema::new("Car")
            .with_field("name", FieldType::String)
            .with_field("speed", FieldType::Number);
        let b = ClassSchema::new("Car")
            .with_field("speed", FieldType::Number)
            .with_field("name", FieldType::String);
        assert_eq!(a, b);

        let c = b.clone().with_field("color", FieldType::String);
        assert_ne!(a, c);
    }

    #[test]
    fn test_class_schema_deserialize() {
        let class: ClassSchema = serde_json::from_value(json!({
            "className": "_User",
            "fields": {"username": {"type": "String"}}
        }))
        .unwrap();
        assert!(class.is_reserved());
        assert_eq!(class.fields.get("username"), Some(&FieldType::String));
    }

    #[test]
    fn test_find_query_builder() {
        let query = FindQuery::new()
            .with_constraint("color", json!("red"))
            .with_order("name", true)
            .with_skip(2)
            .with_limit(10);
        assert_eq!(query.constraints.len(), 1);
        assert_eq!(query.order[0].field, "name");
        assert_eq!(query.skip, 2);
        assert_eq!(query.limit, Some(10));
    }
}
