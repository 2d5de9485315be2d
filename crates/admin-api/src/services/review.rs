//! The moderation pipeline behind the status-change endpoints.
//!
//! Each status change runs three steps: patch the record, push to the
//! affected user, persist a notification for their feed. Only the patch is
//! fatal; the fan-out steps degrade to flags in the response.

use serde_json::json;
use tracing::{debug, info, warn};

use homeboy_records::{Inquiry, Listing, RecordError, ReviewStatus};

use crate::services::notify::notify_user;
use crate::{ApiError, AppState};

/// Result of a status change, including whether the record actually moved
/// and how the fan-out went.
pub struct StatusChangeOutcome<T> {
    pub record: T,
    pub changed: bool,
    pub push_delivered: bool,
    pub notification_recorded: bool,
}

impl<T> StatusChangeOutcome<T> {
    fn unchanged(record: T) -> Self {
        Self {
            record,
            changed: false,
            push_delivered: false,
            notification_recorded: false,
        }
    }
}

pub async fn apply_listing_status(
    state: &AppState,
    id: &str,
    next: ReviewStatus,
) -> Result<StatusChangeOutcome<Listing>, ApiError> {
    let current = state.listings().find(id).await?;

    // Re-submitting the decision that already stands is a no-op, not an
    // error; moving between final states is.
    if current.status == next {
        debug!(listing_id = id, status = %next, "listing already in requested status");
        return Ok(StatusChangeOutcome::unchanged(current));
    }
    if !current.status.can_transition_to(next) {
        return Err(RecordError::IllegalTransition {
            from: current.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    let listing = state.listings().set_status(id, next).await?;
    info!(listing_id = id, status = %next, "listing status updated");

    let (title, body) = match next {
        ReviewStatus::Approved => (
            "Listing approved",
            format!("Your listing \"{}\" is now live.", listing.title),
        ),
        ReviewStatus::Rejected => (
            "Listing rejected",
            format!("Your listing \"{}\" was not approved.", listing.title),
        ),
        ReviewStatus::Pending => (
            "Listing updated",
            format!("Your listing \"{}\" is back under review.", listing.title),
        ),
    };

    let (push_delivered, notification_recorded) = notify_user(
        state,
        &listing.owner_uid,
        title,
        &body,
        json!({ "listing_id": listing.id, "status": next }),
    )
    .await;

    state.stats_cache().mark_dirty().await;

    Ok(StatusChangeOutcome {
        record: listing,
        changed: true,
        push_delivered,
        notification_recorded,
    })
}

pub async fn apply_inquiry_status(
    state: &AppState,
    id: &str,
    next: ReviewStatus,
) -> Result<StatusChangeOutcome<Inquiry>, ApiError> {
    let current = state.inquiries().find(id).await?;

    if current.status == next {
        debug!(inquiry_id = id, status = %next, "inquiry already in requested status");
        return Ok(StatusChangeOutcome::unchanged(current));
    }
    if !current.status.can_transition_to(next) {
        return Err(RecordError::IllegalTransition {
            from: current.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    let inquiry = state.inquiries().set_status(id, next).await?;
    info!(inquiry_id = id, status = %next, "inquiry status updated");

    // Inquiries come in by email; the sender only gets a push if that email
    // maps onto a registered profile.
    let mut push_delivered = false;
    let mut notification_recorded = false;
    match state.users().find_by_email(&inquiry.email).await {
        Ok(Some(profile)) => {
            let (title, body) = match next {
                ReviewStatus::Approved => (
                    "Inquiry accepted",
                    "An agent will be in touch about your inquiry.".to_string(),
                ),
                ReviewStatus::Rejected => (
                    "Inquiry closed",
                    "Your inquiry could not be taken further.".to_string(),
                ),
                ReviewStatus::Pending => (
                    "Inquiry reopened",
                    "Your inquiry is being looked at again.".to_string(),
                ),
            };

            (push_delivered, notification_recorded) = notify_user(
                state,
                &profile.uid,
                title,
                &body,
                json!({ "inquiry_id": inquiry.id, "status": next }),
            )
            .await;
        }
        Ok(None) => {
            debug!(inquiry_id = id, "no profile for inquiry email, skipping fan-out");
        }
        Err(error) => {
            warn!(inquiry_id = id, %error, "failed to resolve inquiry sender, skipping fan-out");
        }
    }

    state.stats_cache().mark_dirty().await;

    Ok(StatusChangeOutcome {
        record: inquiry,
        changed: true,
        push_delivered,
        notification_recorded,
    })
}
