//! Dashboard statistics endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::debug;

use crate::services::stats::{aggregate, DashboardStats};
use crate::{ApiError, AppState};

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Usage statistics for the dashboard", body = DashboardStats),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    if let Some(snapshot) = state.stats_cache().fresh_snapshot().await {
        debug!("serving cached dashboard stats");
        return Ok(Json(snapshot));
    }

    let read_at = Instant::now();
    let listings = state.listings().all().await?;
    let inquiries = state.inquiries().all().await?;
    let total_users = state.users().count().await?;

    let stats = aggregate(&listings, &inquiries, total_users, Utc::now());
    state.stats_cache().store(stats.clone(), read_at).await;

    Ok(Json(stats))
}
