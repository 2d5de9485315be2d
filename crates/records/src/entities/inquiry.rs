//! Inquiry entity definitions.

use serde::{Deserialize, Serialize};

use homeboy_platform::Document;

use crate::entities::status::ReviewStatus;
use crate::error::{RecordError, RecordResult};

/// A buyer's request for more information about a listing, submitted from
/// the mobile app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub listing_id: String,
    pub status: ReviewStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Inquiry {
    pub const COLLECTION: &'static str = "inquiries";

    pub fn from_document(doc: &Document) -> RecordResult<Self> {
        let mut inquiry: Inquiry =
            serde_json::from_value(doc.fields.clone()).map_err(|e| RecordError::Malformed {
                collection: Self::COLLECTION.to_string(),
                id: doc.id.clone(),
                message: e.to_string(),
            })?;

        inquiry.id = doc.id.clone();
        if inquiry.created_at.is_empty() {
            inquiry.created_at = doc.create_time.to_rfc3339();
        }
        if inquiry.updated_at.is_empty() {
            inquiry.updated_at = doc.update_time.to_rfc3339();
        }
        Ok(inquiry)
    }
}
