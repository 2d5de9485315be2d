//! Notification feed for the signed-in admin plus manual sends.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use homeboy_platform::UserRecord;
use homeboy_records::NotificationRecord;

use crate::services::notify::notify_user;
use crate::{ApiError, AppState};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub unseen_only: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SeenUpdateRequest {
    pub seen: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub user_uid: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub push_delivered: bool,
    pub notification_recorded: bool,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<NotificationRecord>>, ApiError> {
    let records = state
        .notifications()
        .list_for_user(
            &admin.uid,
            query.unseen_only,
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(records))
}

pub async fn unseen_count(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
) -> Result<Json<Value>, ApiError> {
    let count = state.notifications().unseen_count(&admin.uid).await?;
    Ok(Json(json!({ "unseen_count": count })))
}

pub async fn mark_seen(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
    Path(id): Path<String>,
    Json(request): Json<SeenUpdateRequest>,
) -> Result<Json<NotificationRecord>, ApiError> {
    let record = state
        .notifications()
        .set_seen(&id, &admin.uid, request.seen)
        .await?;
    Ok(Json(record))
}

/// Manual push from the dashboard, e.g. to nudge a seller about missing
/// photos. Uses the same fan-out as the review pipeline.
pub async fn send_notification(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, ApiError> {
    if request.user_uid.trim().is_empty() {
        return Err(ApiError::bad_request("user_uid is required"));
    }
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if request.body.trim().is_empty() {
        return Err(ApiError::bad_request("body is required"));
    }

    // The target must exist; a typo'd uid would otherwise vanish silently.
    if state.users().find(&request.user_uid).await?.is_none() {
        return Err(ApiError::not_found(format!(
            "user {} not found",
            request.user_uid
        )));
    }

    let (push_delivered, notification_recorded) = notify_user(
        &state,
        &request.user_uid,
        &request.title,
        &request.body,
        request.data,
    )
    .await;

    Ok(Json(SendNotificationResponse {
        success: true,
        push_delivered,
        notification_recorded,
    }))
}
