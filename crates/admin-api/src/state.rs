use std::sync::Arc;
use std::time::Duration;

use homeboy_config::{AppConfig, AuthConfig};
use homeboy_platform::{DocumentStore, IdentityProvider, PushGateway, UserRecord};
use homeboy_records::{
    InquiryRepository, ListingRepository, NotificationRepository, UserRepository,
};

use crate::services::stats::StatsCache;
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    identity: Arc<dyn IdentityProvider>,
    push: Arc<dyn PushGateway>,
    auth: AuthConfig,
    listings: ListingRepository,
    inquiries: InquiryRepository,
    notifications: NotificationRepository,
    users: UserRepository,
    stats_cache: StatsCache,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        push: Arc<dyn PushGateway>,
        config: &AppConfig,
    ) -> Self {
        Self {
            identity,
            push,
            auth: config.auth.clone(),
            listings: ListingRepository::new(store.clone()),
            inquiries: InquiryRepository::new(store.clone()),
            notifications: NotificationRepository::new(store.clone()),
            users: UserRepository::new(store),
            stats_cache: StatsCache::new(Duration::from_millis(
                config.dashboard.refresh_debounce_ms,
            )),
        }
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn push(&self) -> &dyn PushGateway {
        self.push.as_ref()
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.session_ttl_seconds)
    }

    pub fn listings(&self) -> &ListingRepository {
        &self.listings
    }

    pub fn inquiries(&self) -> &InquiryRepository {
        &self.inquiries
    }

    pub fn notifications(&self) -> &NotificationRepository {
        &self.notifications
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn stats_cache(&self) -> &StatsCache {
        &self.stats_cache
    }

    pub async fn authenticate(&self, cookie: &str) -> Result<UserRecord, ApiError> {
        self.identity
            .verify_session_cookie(cookie)
            .await
            .map_err(ApiError::from)
    }
}
