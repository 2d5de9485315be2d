//! Listing entity definitions.

use serde::{Deserialize, Serialize};

use homeboy_platform::Document;

use crate::entities::status::ReviewStatus;
use crate::error::{RecordError, RecordResult};

/// A property record submitted for admin approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub beds: u32,
    pub baths: u32,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub status: ReviewStatus,
    pub owner_uid: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub beds: u32,
    pub baths: u32,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub owner_uid: String,
}

impl Listing {
    pub const COLLECTION: &'static str = "listings";

    pub fn from_document(doc: &Document) -> RecordResult<Self> {
        let mut listing: Listing =
            serde_json::from_value(doc.fields.clone()).map_err(|e| RecordError::Malformed {
                collection: Self::COLLECTION.to_string(),
                id: doc.id.clone(),
                message: e.to_string(),
            })?;

        listing.id = doc.id.clone();
        // Older mobile clients did not write timestamp fields; fall back to
        // the store's document metadata.
        if listing.created_at.is_empty() {
            listing.created_at = doc.create_time.to_rfc3339();
        }
        if listing.updated_at.is_empty() {
            listing.updated_at = doc.update_time.to_rfc3339();
        }
        Ok(listing)
    }
}
