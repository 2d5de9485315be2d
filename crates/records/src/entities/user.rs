//! User profile entity definitions.

use serde::{Deserialize, Serialize};

use homeboy_platform::Document;

use crate::error::{RecordError, RecordResult};

/// The `users/{uid}` profile document. The directory itself (passwords,
/// sessions) lives in the identity service; this document carries the app
/// profile and the push token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub push_token: Option<String>,
    /// Legacy field name written by early mobile builds.
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    pub const COLLECTION: &'static str = "users";

    pub fn from_document(doc: &Document) -> RecordResult<Self> {
        let mut profile: UserProfile =
            serde_json::from_value(doc.fields.clone()).map_err(|e| RecordError::Malformed {
                collection: Self::COLLECTION.to_string(),
                id: doc.id.clone(),
                message: e.to_string(),
            })?;

        profile.uid = doc.id.clone();
        if profile.created_at.is_empty() {
            profile.created_at = doc.create_time.to_rfc3339();
        }
        if profile.updated_at.is_empty() {
            profile.updated_at = doc.update_time.to_rfc3339();
        }
        Ok(profile)
    }

    /// Current token field first, legacy field second.
    pub fn registered_push_token(&self) -> Option<&str> {
        self.push_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .or_else(|| {
                self.device_token
                    .as_deref()
                    .filter(|token| !token.is_empty())
            })
    }
}
