//! Document-store client.
//!
//! Collections of JSON documents live in the managed platform; this module
//! wraps its REST surface. `patch` has merge semantics: top-level keys of the
//! submitted object replace the stored ones, everything else is preserved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use homeboy_config::PlatformConfig;

use crate::error::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Value,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> PlatformResult<Option<Document>>;

    async fn list(&self, collection: &str) -> PlatformResult<Vec<Document>>;

    /// Create a document. When `id` is `None` the store assigns one.
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Value,
    ) -> PlatformResult<Document>;

    /// Merge `fields` into an existing document.
    async fn patch(&self, collection: &str, id: &str, fields: Value) -> PlatformResult<Document>;

    async fn delete(&self, collection: &str, id: &str) -> PlatformResult<()>;
}

/// HTTP client for the platform's document service.
#[derive(Clone)]
pub struct RestDocumentStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
struct WriteDocumentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    fields: &'a Value,
}

impl RestDocumentStore {
    pub fn new(config: &PlatformConfig) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.documents_base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/collections/{}/documents",
            self.base_url, self.project_id, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> PlatformResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(PlatformError::service(status.as_u16(), message))
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> PlatformResult<Option<Document>> {
        let response = self
            .with_key(self.http.get(self.document_url(collection, id)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = Self::check(response).await?.json::<Document>().await?;
        Ok(Some(document))
    }

    async fn list(&self, collection: &str) -> PlatformResult<Vec<Document>> {
        let response = self
            .with_key(self.http.get(self.collection_url(collection)))
            .send()
            .await?;

        let listing = Self::check(response)
            .await?
            .json::<ListDocumentsResponse>()
            .await?;
        debug!(collection, count = listing.documents.len(), "listed documents");
        Ok(listing.documents)
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Value,
    ) -> PlatformResult<Document> {
        let body = WriteDocumentRequest { id, fields: &fields };
        let response = self
            .with_key(self.http.post(self.collection_url(collection)))
            .json(&body)
            .send()
            .await?;

        let document = Self::check(response).await?.json::<Document>().await?;
        Ok(document)
    }

    async fn patch(&self, collection: &str, id: &str, fields: Value) -> PlatformResult<Document> {
        let response = self
            .with_key(self.http.patch(self.document_url(collection, id)))
            .json(&fields)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(format!("{collection}/{id}")));
        }

        let document = Self::check(response).await?.json::<Document>().await?;
        Ok(document)
    }

    async fn delete(&self, collection: &str, id: &str) -> PlatformResult<()> {
        let response = self
            .with_key(self.http.delete(self.document_url(collection, id)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(format!("{collection}/{id}")));
        }

        Self::check(response).await?;
        Ok(())
    }
}

/// In-memory document store used by the test suites.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<String, HashMap<String, Document>>,
    failing_collections: Vec<String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `collection` fail, for exercising partial-failure
    /// paths.
    pub async fn fail_writes_to(&self, collection: &str) {
        let mut state = self.inner.lock().await;
        state.failing_collections.push(collection.to_string());
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        let state = self.inner.lock().await;
        state
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

fn merge_fields(existing: &mut Value, update: Value) {
    match (existing.as_object_mut(), update) {
        (Some(target), Value::Object(source)) => {
            for (key, value) in source {
                target.insert(key, value);
            }
        }
        (_, update) => *existing = update,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> PlatformResult<Option<Document>> {
        let state = self.inner.lock().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> PlatformResult<Vec<Document>> {
        let state = self.inner.lock().await;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Value,
    ) -> PlatformResult<Document> {
        let mut state = self.inner.lock().await;
        if state.failing_collections.iter().any(|c| c == collection) {
            return Err(PlatformError::service(503, "write rejected"));
        }

        let id = id
            .map(str::to_string)
            .unwrap_or_else(cuid2::create_id);
        let now = Utc::now();
        let document = Document {
            id: id.clone(),
            fields,
            create_time: now,
            update_time: now,
        };

        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());
        Ok(document)
    }

    async fn patch(&self, collection: &str, id: &str, fields: Value) -> PlatformResult<Document> {
        let mut state = self.inner.lock().await;
        if state.failing_collections.iter().any(|c| c == collection) {
            return Err(PlatformError::service(503, "write rejected"));
        }

        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| PlatformError::NotFound(format!("{collection}/{id}")))?;

        merge_fields(&mut document.fields, fields);
        document.update_time = Utc::now();
        Ok(document.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> PlatformResult<()> {
        let mut state = self.inner.lock().await;
        let removed = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));

        match removed {
            Some(_) => Ok(()),
            None => Err(PlatformError::NotFound(format!("{collection}/{id}"))),
        }
    }
}
