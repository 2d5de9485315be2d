//! User-profile repository over the document store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use homeboy_platform::DocumentStore;

use crate::entities::user::UserProfile;
use crate::error::RecordResult;

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, uid: &str) -> RecordResult<Option<UserProfile>> {
        let doc = self.store.get(UserProfile::COLLECTION, uid).await?;
        match doc {
            Some(doc) => Ok(Some(UserProfile::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> RecordResult<Option<UserProfile>> {
        let documents = self.store.list(UserProfile::COLLECTION).await?;
        for doc in &documents {
            match UserProfile::from_document(doc) {
                Ok(profile) if profile.email.eq_ignore_ascii_case(email) => {
                    return Ok(Some(profile))
                }
                Ok(_) => {}
                Err(error) => warn!(id = %doc.id, %error, "skipping undecodable user profile"),
            }
        }
        Ok(None)
    }

    /// Create the profile document for a directory account if it does not
    /// exist yet; the document id is the identity uid.
    pub async fn ensure_profile(
        &self,
        uid: &str,
        email: &str,
        display_name: Option<&str>,
        is_admin: bool,
    ) -> RecordResult<UserProfile> {
        if let Some(existing) = self.find(uid).await? {
            return Ok(existing);
        }

        let now = Utc::now().to_rfc3339();
        let fields = json!({
            "email": email,
            "display_name": display_name,
            "is_admin": is_admin,
            "push_token": null,
            "created_at": now,
            "updated_at": now,
        });

        let doc = self
            .store
            .create(UserProfile::COLLECTION, Some(uid), fields)
            .await?;
        UserProfile::from_document(&doc)
    }

    pub async fn count(&self) -> RecordResult<usize> {
        let documents = self.store.list(UserProfile::COLLECTION).await?;
        Ok(documents.len())
    }
}
