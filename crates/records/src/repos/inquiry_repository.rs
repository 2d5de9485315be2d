//! Inquiry repository over the document store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use homeboy_platform::{DocumentStore, PlatformError};

use crate::entities::inquiry::Inquiry;
use crate::entities::status::ReviewStatus;
use crate::error::{RecordError, RecordResult};

#[derive(Clone)]
pub struct InquiryRepository {
    store: Arc<dyn DocumentStore>,
}

impl InquiryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> RecordResult<Vec<Inquiry>> {
        let documents = self.store.list(Inquiry::COLLECTION).await?;
        let mut inquiries = Vec::with_capacity(documents.len());
        for doc in &documents {
            match Inquiry::from_document(doc) {
                Ok(inquiry) => inquiries.push(inquiry),
                Err(error) => warn!(id = %doc.id, %error, "skipping undecodable inquiry"),
            }
        }
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inquiries)
    }

    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        limit: usize,
        offset: usize,
    ) -> RecordResult<Vec<Inquiry>> {
        let inquiries = self.all().await?;
        Ok(inquiries
            .into_iter()
            .filter(|inquiry| status.map_or(true, |s| inquiry.status == s))
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub async fn find(&self, id: &str) -> RecordResult<Inquiry> {
        let doc = self
            .store
            .get(Inquiry::COLLECTION, id)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("inquiry {id}")))?;
        Inquiry::from_document(&doc)
    }

    pub async fn set_status(&self, id: &str, status: ReviewStatus) -> RecordResult<Inquiry> {
        let fields = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let doc = self
            .store
            .patch(Inquiry::COLLECTION, id, fields)
            .await
            .map_err(|error| match error {
                PlatformError::NotFound(_) => RecordError::NotFound(format!("inquiry {id}")),
                other => RecordError::Platform(other),
            })?;
        Inquiry::from_document(&doc)
    }
}
