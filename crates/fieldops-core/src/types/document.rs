//! Document-store values: stored documents, merge patches, and snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::AppResult;

/// A stored document: a key plus a flat map of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document key, unique within its collection.
    pub key: String,
    /// Field values.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Map::new(),
        }
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the field is present and not null.
    pub fn has(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_null())
    }

    /// Deserialize the fields into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// A value written by a merge patch.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A literal JSON value.
    Value(Value),
    /// Resolved to the store's clock at write time.
    ServerTimestamp,
    /// Resolved to the store's clock only if the field is not yet set.
    ServerTimestampIfAbsent,
}

/// A partial document: only the named fields are written, the rest are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    fields: BTreeMap<String, FieldValue>,
}

impl DocumentPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal field.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::Value(value.into()));
        self
    }

    /// Set a field to the store's clock.
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), FieldValue::ServerTimestamp);
        self
    }

    /// Set a field to the store's clock unless it already has a value.
    pub fn server_timestamp_if_absent(mut self, field: impl Into<String>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::ServerTimestampIfAbsent);
        self
    }

    /// Iterate over the patch's fields.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Get a single field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The full contents of a collection at one notification.
pub type Snapshot = Arc<Vec<Document>>;

/// A live stream of collection snapshots. Dropping it unsubscribes.
pub type SnapshotStream = BoxStream<'static, AppResult<Snapshot>>;
