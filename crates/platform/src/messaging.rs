//! Push-gateway client.
//!
//! Delivery is keyed by the opaque device token stored on the user profile.
//! The gateway is best-effort from the caller's perspective; retry policy
//! lives with the vendor, not here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use homeboy_config::PlatformConfig;

use crate::error::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Value,
}

#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver one message; returns the gateway-assigned message id.
    async fn send(&self, message: &PushMessage) -> PlatformResult<String>;
}

/// HTTP client for the platform's push gateway.
#[derive(Clone)]
pub struct RestPushGateway {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    token: &'a str,
    notification: NotificationBody<'a>,
    data: &'a Value,
}

#[derive(Debug, Serialize)]
struct NotificationBody<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    name: String,
}

impl RestPushGateway {
    pub fn new(config: &PlatformConfig) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.push_base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }
}

#[async_trait]
impl PushGateway for RestPushGateway {
    async fn send(&self, message: &PushMessage) -> PlatformResult<String> {
        let mut request = self.http.post(self.send_url()).json(&SendMessageRequest {
            token: &message.token,
            notification: NotificationBody {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        });
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            // The gateway reports stale device tokens this way.
            return Err(PlatformError::UnregisteredToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlatformError::service(status.as_u16(), message));
        }

        let body = response.json::<SendMessageResponse>().await?;
        debug!(message_id = %body.name, "push message accepted");
        Ok(body.name)
    }
}

/// In-memory push gateway for the test suites; records what was sent and can
/// be switched into a failing mode.
#[derive(Clone, Default)]
pub struct MemoryPushGateway {
    inner: Arc<Mutex<MemoryPushState>>,
}

#[derive(Default)]
struct MemoryPushState {
    sent: Vec<PushMessage>,
    failing: bool,
    counter: u64,
}

impl MemoryPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        self.inner.lock().await.failing = failing;
    }

    pub async fn sent(&self) -> Vec<PushMessage> {
        self.inner.lock().await.sent.clone()
    }
}

#[async_trait]
impl PushGateway for MemoryPushGateway {
    async fn send(&self, message: &PushMessage) -> PlatformResult<String> {
        let mut state = self.inner.lock().await;
        if state.failing {
            return Err(PlatformError::service(503, "gateway unavailable"));
        }

        state.counter += 1;
        let id = format!("messages/{}", state.counter);
        state.sent.push(message.clone());
        Ok(id)
    }
}
