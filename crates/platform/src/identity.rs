//! Identity-provider client.
//!
//! Account creation, password verification, and session cookies are all owned
//! by the managed identity service; this module only shapes requests and maps
//! its error vocabulary onto `PlatformError`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use homeboy_config::PlatformConfig;

use crate::error::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignInResponse {
    pub uid: String,
    pub id_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> PlatformResult<UserRecord>;

    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<SignInResponse>;

    /// Exchange a fresh id token for a long-lived session cookie.
    async fn create_session_cookie(&self, id_token: &str, ttl: Duration) -> PlatformResult<String>;

    async fn verify_session_cookie(&self, cookie: &str) -> PlatformResult<UserRecord>;

    async fn revoke_sessions(&self, uid: &str) -> PlatformResult<()>;
}

/// HTTP client for the platform's identity service.
#[derive(Clone)]
pub struct RestIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCookieRequest<'a> {
    id_token: &'a str,
    valid_duration: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieResponse {
    session_cookie: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifySessionCookieRequest<'a> {
    session_cookie: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    error: ServiceErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceErrorDetail {
    #[serde(default)]
    message: String,
}

impl RestIdentityProvider {
    pub fn new(config: &PlatformConfig) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.identity_base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn accounts_url(&self, action: &str) -> String {
        format!("{}/v1/accounts:{}", self.base_url, action)
    }

    fn project_url(&self, action: &str) -> String {
        format!("{}/v1/projects/{}:{}", self.base_url, self.project_id, action)
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    /// The identity service reports failures as `{ "error": { "message": ... } }`
    /// with a coarse status code; the message string is the real discriminant.
    async fn map_error(response: reqwest::Response) -> PlatformError {
        let status = response.status().as_u16();
        let message = match response.json::<ServiceErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => String::new(),
        };

        match message.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                PlatformError::InvalidCredentials
            }
            "EMAIL_EXISTS" => PlatformError::AccountExists,
            "INVALID_SESSION_COOKIE" | "SESSION_COOKIE_EXPIRED" => PlatformError::InvalidSession,
            _ => PlatformError::service(status, message),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> PlatformResult<UserRecord> {
        let response = self
            .with_key(self.http.post(self.accounts_url("signUp")))
            .json(&SignUpRequest {
                email,
                password,
                display_name,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let account = response.json::<AccountResponse>().await?;
        Ok(UserRecord {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<SignInResponse> {
        let response = self
            .with_key(self.http.post(self.accounts_url("signInWithPassword")))
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let account = response.json::<AccountResponse>().await?;
        let id_token = account
            .id_token
            .ok_or_else(|| PlatformError::service(502, "sign-in response missing id token"))?;

        Ok(SignInResponse {
            uid: account.local_id,
            id_token,
        })
    }

    async fn create_session_cookie(&self, id_token: &str, ttl: Duration) -> PlatformResult<String> {
        let response = self
            .with_key(self.http.post(self.project_url("createSessionCookie")))
            .json(&CreateSessionCookieRequest {
                id_token,
                valid_duration: ttl.as_secs(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let body = response.json::<SessionCookieResponse>().await?;
        Ok(body.session_cookie)
    }

    async fn verify_session_cookie(&self, cookie: &str) -> PlatformResult<UserRecord> {
        let response = self
            .with_key(self.http.post(self.project_url("verifySessionCookie")))
            .json(&VerifySessionCookieRequest {
                session_cookie: cookie,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let account = response.json::<AccountResponse>().await?;
        Ok(UserRecord {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
        })
    }

    async fn revoke_sessions(&self, uid: &str) -> PlatformResult<()> {
        let url = format!(
            "{}/v1/projects/{}/accounts/{}:revokeTokens",
            self.base_url, self.project_id, uid
        );
        let response = self.with_key(self.http.post(url)).send().await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        Ok(())
    }
}

/// In-memory identity provider for the test suites.
#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    inner: Arc<Mutex<MemoryIdentityState>>,
}

#[derive(Default)]
struct MemoryIdentityState {
    accounts: HashMap<String, MemoryAccount>,
    id_tokens: HashMap<String, String>,
    sessions: HashMap<String, MemorySession>,
}

struct MemoryAccount {
    uid: String,
    password: String,
    display_name: Option<String>,
}

struct MemorySession {
    uid: String,
    expires_at: Instant,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn random_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    fn record_for(email: &str, account: &MemoryAccount) -> UserRecord {
        UserRecord {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: account.display_name.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> PlatformResult<UserRecord> {
        let mut state = self.inner.lock().await;
        if state.accounts.contains_key(email) {
            return Err(PlatformError::AccountExists);
        }

        let account = MemoryAccount {
            uid: cuid2::create_id(),
            password: password.to_string(),
            display_name: display_name.map(str::to_string),
        };
        let record = Self::record_for(email, &account);
        state.accounts.insert(email.to_string(), account);
        Ok(record)
    }

    async fn sign_in(&self, email: &str, password: &str) -> PlatformResult<SignInResponse> {
        let mut state = self.inner.lock().await;
        let uid = match state.accounts.get(email) {
            Some(account) if account.password == password => account.uid.clone(),
            _ => return Err(PlatformError::InvalidCredentials),
        };

        let id_token = Self::random_token();
        state.id_tokens.insert(id_token.clone(), uid.clone());
        Ok(SignInResponse { uid, id_token })
    }

    async fn create_session_cookie(&self, id_token: &str, ttl: Duration) -> PlatformResult<String> {
        let mut state = self.inner.lock().await;
        let uid = state
            .id_tokens
            .remove(id_token)
            .ok_or(PlatformError::InvalidSession)?;

        let cookie = Self::random_token();
        state.sessions.insert(
            cookie.clone(),
            MemorySession {
                uid,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(cookie)
    }

    async fn verify_session_cookie(&self, cookie: &str) -> PlatformResult<UserRecord> {
        let state = self.inner.lock().await;
        let session = state
            .sessions
            .get(cookie)
            .ok_or(PlatformError::InvalidSession)?;

        if session.expires_at <= Instant::now() {
            return Err(PlatformError::InvalidSession);
        }

        state
            .accounts
            .iter()
            .find(|(_, account)| account.uid == session.uid)
            .map(|(email, account)| Self::record_for(email, account))
            .ok_or(PlatformError::InvalidSession)
    }

    async fn revoke_sessions(&self, uid: &str) -> PlatformResult<()> {
        let mut state = self.inner.lock().await;
        state.sessions.retain(|_, session| session.uid != uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in_issues_session() {
        let identity = MemoryIdentityProvider::new();
        identity
            .sign_up("admin@homeboy.app", "hunter2", Some("Admin"))
            .await
            .unwrap();

        let signed_in = identity.sign_in("admin@homeboy.app", "hunter2").await.unwrap();
        let cookie = identity
            .create_session_cookie(&signed_in.id_token, Duration::from_secs(60))
            .await
            .unwrap();

        let record = identity.verify_session_cookie(&cookie).await.unwrap();
        assert_eq!(record.email, "admin@homeboy.app");
        assert_eq!(record.uid, signed_in.uid);
        assert_eq!(record.display_name.as_deref(), Some("Admin"));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let identity = MemoryIdentityProvider::new();
        identity
            .sign_up("admin@homeboy.app", "hunter2", None)
            .await
            .unwrap();

        let err = identity
            .sign_in("admin@homeboy.app", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let identity = MemoryIdentityProvider::new();
        identity
            .sign_up("admin@homeboy.app", "hunter2", None)
            .await
            .unwrap();

        let err = identity
            .sign_up("admin@homeboy.app", "other", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::AccountExists));
    }

    #[tokio::test]
    async fn id_token_is_single_use() {
        let identity = MemoryIdentityProvider::new();
        identity
            .sign_up("admin@homeboy.app", "hunter2", None)
            .await
            .unwrap();
        let signed_in = identity.sign_in("admin@homeboy.app", "hunter2").await.unwrap();

        identity
            .create_session_cookie(&signed_in.id_token, Duration::from_secs(60))
            .await
            .unwrap();
        let err = identity
            .create_session_cookie(&signed_in.id_token, Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::InvalidSession));
    }

    #[tokio::test]
    async fn revoking_sessions_invalidates_cookies() {
        let identity = MemoryIdentityProvider::new();
        identity
            .sign_up("admin@homeboy.app", "hunter2", None)
            .await
            .unwrap();
        let signed_in = identity.sign_in("admin@homeboy.app", "hunter2").await.unwrap();
        let cookie = identity
            .create_session_cookie(&signed_in.id_token, Duration::from_secs(60))
            .await
            .unwrap();

        identity.revoke_sessions(&signed_in.uid).await.unwrap();

        let err = identity.verify_session_cookie(&cookie).await.unwrap_err();
        assert!(matches!(err, PlatformError::InvalidSession));
    }
}
