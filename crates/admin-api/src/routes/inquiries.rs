//! Buyer-inquiry moderation endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use homeboy_records::{Inquiry, ReviewStatus};

use crate::routes::listings::{ListQuery, StatusUpdateRequest};
use crate::services::review::apply_inquiry_status;
use crate::{ApiError, AppState};

#[derive(Serialize)]
pub struct InquiryStatusResponse {
    pub success: bool,
    pub inquiry: Inquiry,
    pub changed: bool,
    pub push_delivered: bool,
    pub notification_recorded: bool,
}

pub async fn list_inquiries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Inquiry>>, ApiError> {
    let status = query.status_filter()?;
    let inquiries = state
        .inquiries()
        .list(status, query.limit(), query.offset())
        .await?;
    Ok(Json(inquiries))
}

pub async fn get_inquiry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Inquiry>, ApiError> {
    let inquiry = state.inquiries().find(&id).await?;
    Ok(Json(inquiry))
}

pub async fn update_inquiry_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<InquiryStatusResponse>, ApiError> {
    let next = request.status.parse::<ReviewStatus>()?;
    let outcome = apply_inquiry_status(&state, &id, next).await?;

    Ok(Json(InquiryStatusResponse {
        success: true,
        inquiry: outcome.record,
        changed: outcome.changed,
        push_delivered: outcome.push_delivered,
        notification_recorded: outcome.notification_recorded,
    }))
}
