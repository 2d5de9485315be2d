//! Listing repository over the document store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use homeboy_platform::{DocumentStore, PlatformError};

use crate::entities::listing::{CreateListingRequest, Listing};
use crate::entities::status::ReviewStatus;
use crate::error::{RecordError, RecordResult};

#[derive(Clone)]
pub struct ListingRepository {
    store: Arc<dyn DocumentStore>,
}

impl ListingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All decodable listings, newest first. Documents that fail to decode
    /// are skipped with a warning; the mobile clients write these and the
    /// store enforces no schema.
    pub async fn all(&self) -> RecordResult<Vec<Listing>> {
        let documents = self.store.list(Listing::COLLECTION).await?;
        let mut listings = Vec::with_capacity(documents.len());
        for doc in &documents {
            match Listing::from_document(doc) {
                Ok(listing) => listings.push(listing),
                Err(error) => warn!(id = %doc.id, %error, "skipping undecodable listing"),
            }
        }
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        limit: usize,
        offset: usize,
    ) -> RecordResult<Vec<Listing>> {
        let listings = self.all().await?;
        Ok(listings
            .into_iter()
            .filter(|listing| status.map_or(true, |s| listing.status == s))
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub async fn find(&self, id: &str) -> RecordResult<Listing> {
        let doc = self
            .store
            .get(Listing::COLLECTION, id)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("listing {id}")))?;
        Listing::from_document(&doc)
    }

    pub async fn create(&self, request: CreateListingRequest) -> RecordResult<Listing> {
        let now = Utc::now().to_rfc3339();
        let fields = json!({
            "title": request.title,
            "description": request.description,
            "price": request.price,
            "location": request.location,
            "beds": request.beds,
            "baths": request.baths,
            "image_urls": request.image_urls,
            "status": ReviewStatus::Pending,
            "owner_uid": request.owner_uid,
            "created_at": now,
            "updated_at": now,
        });

        let doc = self.store.create(Listing::COLLECTION, None, fields).await?;
        Listing::from_document(&doc)
    }

    pub async fn set_status(&self, id: &str, status: ReviewStatus) -> RecordResult<Listing> {
        let fields = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let doc = self
            .store
            .patch(Listing::COLLECTION, id, fields)
            .await
            .map_err(|error| match error {
                PlatformError::NotFound(_) => RecordError::NotFound(format!("listing {id}")),
                other => RecordError::Platform(other),
            })?;
        Listing::from_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeboy_platform::MemoryDocumentStore;

    fn repo() -> (ListingRepository, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        (ListingRepository::new(store.clone()), store)
    }

    fn request(title: &str) -> CreateListingRequest {
        CreateListingRequest {
            title: title.to_string(),
            description: "A place".to_string(),
            price: 250_000.0,
            location: "Durham".to_string(),
            beds: 3,
            baths: 2,
            image_urls: vec![],
            owner_uid: "owner-1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let (repo, _) = repo();
        let listing = repo.create(request("First")).await.unwrap();

        assert_eq!(listing.status, ReviewStatus::Pending);
        assert!(!listing.id.is_empty());
        assert!(!listing.created_at.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (repo, _) = repo();
        let first = repo.create(request("First")).await.unwrap();
        repo.create(request("Second")).await.unwrap();
        repo.set_status(&first.id, ReviewStatus::Approved)
            .await
            .unwrap();

        let approved = repo
            .list(Some(ReviewStatus::Approved), 50, 0)
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, first.id);

        let pending = repo.list(Some(ReviewStatus::Pending), 50, 0).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Second");
    }

    #[tokio::test]
    async fn list_skips_undecodable_documents() {
        let (repo, store) = repo();
        repo.create(request("Good")).await.unwrap();
        store
            .create(Listing::COLLECTION, Some("bad"), serde_json::json!({"title": 42}))
            .await
            .unwrap();

        let listings = repo.list(None, 50, 0).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Good");
    }

    #[tokio::test]
    async fn set_status_on_missing_listing_is_not_found() {
        let (repo, _) = repo();
        let err = repo
            .set_status("missing", ReviewStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::NotFound(_)));
    }
}
