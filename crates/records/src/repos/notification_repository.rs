//! Notification-record repository over the document store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use homeboy_platform::DocumentStore;

use crate::entities::notification::{CreateNotificationRecord, NotificationRecord};
use crate::error::{RecordError, RecordResult};

#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn DocumentStore>,
}

impl NotificationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateNotificationRecord,
    ) -> RecordResult<NotificationRecord> {
        let fields = json!({
            "title": request.title,
            "body": request.body,
            "user_uid": request.user_uid,
            "seen": false,
            "data": request.data,
            "created_at": Utc::now().to_rfc3339(),
        });

        let doc = self
            .store
            .create(NotificationRecord::COLLECTION, None, fields)
            .await?;
        NotificationRecord::from_document(&doc)
    }

    async fn all_for_user(&self, user_uid: &str) -> RecordResult<Vec<NotificationRecord>> {
        let documents = self.store.list(NotificationRecord::COLLECTION).await?;
        let mut records = Vec::new();
        for doc in &documents {
            match NotificationRecord::from_document(doc) {
                Ok(record) if record.user_uid == user_uid => records.push(record),
                Ok(_) => {}
                Err(error) => warn!(id = %doc.id, %error, "skipping undecodable notification"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn list_for_user(
        &self,
        user_uid: &str,
        unseen_only: bool,
        limit: usize,
        offset: usize,
    ) -> RecordResult<Vec<NotificationRecord>> {
        let records = self.all_for_user(user_uid).await?;
        Ok(records
            .into_iter()
            .filter(|record| !unseen_only || !record.seen)
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub async fn unseen_count(&self, user_uid: &str) -> RecordResult<usize> {
        let records = self.all_for_user(user_uid).await?;
        Ok(records.iter().filter(|record| !record.seen).count())
    }

    /// Flip the seen flag. Records belonging to another user read as absent.
    pub async fn set_seen(
        &self,
        id: &str,
        user_uid: &str,
        seen: bool,
    ) -> RecordResult<NotificationRecord> {
        let doc = self
            .store
            .get(NotificationRecord::COLLECTION, id)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("notification {id}")))?;

        let record = NotificationRecord::from_document(&doc)?;
        if record.user_uid != user_uid {
            return Err(RecordError::NotFound(format!("notification {id}")));
        }

        let doc = self
            .store
            .patch(NotificationRecord::COLLECTION, id, json!({ "seen": seen }))
            .await?;
        NotificationRecord::from_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeboy_platform::MemoryDocumentStore;
    use serde_json::json;

    fn repo() -> NotificationRepository {
        NotificationRepository::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn request(user_uid: &str, title: &str) -> CreateNotificationRecord {
        CreateNotificationRecord {
            user_uid: user_uid.to_string(),
            title: title.to_string(),
            body: "body".to_string(),
            data: json!({"kind": "test"}),
        }
    }

    #[tokio::test]
    async fn created_records_start_unseen() {
        let repo = repo();
        let record = repo.create(request("u1", "Hello")).await.unwrap();

        assert!(!record.seen);
        assert_eq!(repo.unseen_count("u1").await.unwrap(), 1);
        assert_eq!(repo.unseen_count("u2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_for_user_respects_unseen_filter() {
        let repo = repo();
        let first = repo.create(request("u1", "First")).await.unwrap();
        repo.create(request("u1", "Second")).await.unwrap();
        repo.create(request("u2", "Other user")).await.unwrap();

        repo.set_seen(&first.id, "u1", true).await.unwrap();

        let all = repo.list_for_user("u1", false, 50, 0).await.unwrap();
        assert_eq!(all.len(), 2);

        let unseen = repo.list_for_user("u1", true, 50, 0).await.unwrap();
        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].title, "Second");
    }

    #[tokio::test]
    async fn set_seen_hides_other_users_records() {
        let repo = repo();
        let record = repo.create(request("u1", "Private")).await.unwrap();

        let err = repo.set_seen(&record.id, "u2", true).await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound(_)));

        // Still unseen for the owner.
        assert_eq!(repo.unseen_count("u1").await.unwrap(), 1);
    }
}
