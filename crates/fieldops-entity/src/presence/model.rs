//! Presence record value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fieldops_core::result::AppResult;
use fieldops_core::types::{Coordinates, Document, Identity};

use super::fields;

/// Last-known presence for one staff member.
///
/// One record exists per identity; writes merge into it and no history is
/// kept. `is_online` is set on every report and never cleared, so staleness
/// has to be judged from `last_location_update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// Stable user key.
    pub identity: Identity,
    /// UI label.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Last reported latitude; absent until the first successful report.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Last reported longitude; absent until the first successful report.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Accuracy radius of the last fix in metres.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Liveness flag.
    #[serde(default)]
    pub is_online: bool,
    /// Server time of the last location write.
    #[serde(default)]
    pub last_location_update: Option<DateTime<Utc>>,
    /// Server time of the last write.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Server time the record was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PresenceRecord {
    /// Decode a stored document. The document key stands in for a missing
    /// `identity` field.
    pub fn from_document(doc: &Document) -> AppResult<Self> {
        let mut fields = doc.fields.clone();
        if !doc.has(fields::IDENTITY) {
            fields.insert(fields::IDENTITY.to_string(), Value::String(doc.key.clone()));
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Coordinates of the last fix, if both components are present and finite.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_finite)
            }
            _ => None,
        }
    }

    /// Whether the record carries a usable fix.
    pub fn has_fix(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Label for lists and popups.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.identity.display_name())
    }
}
