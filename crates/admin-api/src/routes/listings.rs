//! Listing moderation endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use homeboy_records::{CreateListingRequest, Listing, ReviewStatus};

use crate::services::review::apply_listing_status;
use crate::{ApiError, AppState};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListQuery {
    pub fn status_filter(&self) -> Result<Option<ReviewStatus>, ApiError> {
        match &self.status {
            Some(raw) => Ok(Some(raw.parse::<ReviewStatus>()?)),
            None => Ok(None),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct ListingStatusResponse {
    pub success: bool,
    pub listing: Listing,
    pub changed: bool,
    pub push_delivered: bool,
    pub notification_recorded: bool,
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let status = query.status_filter()?;
    let listings = state
        .listings()
        .list(status, query.limit(), query.offset())
        .await?;
    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let listing = state.listings().find(&id).await?;
    Ok(Json(listing))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> Result<Json<Listing>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if request.description.trim().is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }
    if request.location.trim().is_empty() {
        return Err(ApiError::bad_request("location is required"));
    }
    if !request.price.is_finite() || request.price <= 0.0 {
        return Err(ApiError::bad_request("price must be a positive number"));
    }

    let listing = state.listings().create(request).await?;
    state.stats_cache().mark_dirty().await;

    info!(listing_id = %listing.id, "listing created");
    Ok(Json(listing))
}

pub async fn update_listing_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<ListingStatusResponse>, ApiError> {
    let next = request.status.parse::<ReviewStatus>()?;
    let outcome = apply_listing_status(&state, &id, next).await?;

    Ok(Json(ListingStatusResponse {
        success: true,
        listing: outcome.record,
        changed: outcome.changed,
        push_delivered: outcome.push_delivered,
        notification_recorded: outcome.notification_recorded,
    }))
}
