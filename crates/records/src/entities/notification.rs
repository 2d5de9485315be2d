//! Notification record definitions.
//!
//! These are the denormalized in-app notification documents, distinct from
//! the push messages handed to the gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use homeboy_platform::Document;

use crate::error::{RecordError, RecordResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub body: String,
    pub user_uid: String,
    #[serde(default)]
    pub seen: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationRecord {
    pub user_uid: String,
    pub title: String,
    pub body: String,
    pub data: Value,
}

impl NotificationRecord {
    pub const COLLECTION: &'static str = "notifications";

    pub fn from_document(doc: &Document) -> RecordResult<Self> {
        let mut record: NotificationRecord =
            serde_json::from_value(doc.fields.clone()).map_err(|e| RecordError::Malformed {
                collection: Self::COLLECTION.to_string(),
                id: doc.id.clone(),
                message: e.to_string(),
            })?;

        record.id = doc.id.clone();
        if record.created_at.is_empty() {
            record.created_at = doc.create_time.to_rfc3339();
        }
        Ok(record)
    }
}
