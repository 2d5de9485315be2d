//! Best-effort notification fan-out.
//!
//! A push delivery and a persisted notification record are both nice to have
//! but neither may fail the operation that triggered them. Failures are
//! logged and reported back as flags so callers can surface them.

use serde_json::Value;
use tracing::{debug, warn};

use homeboy_records::CreateNotificationRecord;

use crate::AppState;

/// Outcome flags for one fan-out: (push_delivered, notification_recorded).
pub type NotifyOutcome = (bool, bool);

/// Push a message to the user's registered device, if any, and persist a
/// notification record for their in-app feed.
pub async fn notify_user(
    state: &AppState,
    user_uid: &str,
    title: &str,
    body: &str,
    data: Value,
) -> NotifyOutcome {
    let push_delivered = send_push(state, user_uid, title, body, &data).await;

    let notification_recorded = match state
        .notifications()
        .create(CreateNotificationRecord {
            user_uid: user_uid.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
        })
        .await
    {
        Ok(record) => {
            debug!(user_uid, notification_id = %record.id, "notification recorded");
            true
        }
        Err(error) => {
            warn!(user_uid, %error, "failed to record notification");
            false
        }
    };

    (push_delivered, notification_recorded)
}

async fn send_push(
    state: &AppState,
    user_uid: &str,
    title: &str,
    body: &str,
    data: &Value,
) -> bool {
    let profile = match state.users().find(user_uid).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            debug!(user_uid, "no profile for push target");
            return false;
        }
        Err(error) => {
            warn!(user_uid, %error, "failed to load profile for push");
            return false;
        }
    };

    let Some(token) = profile.registered_push_token() else {
        debug!(user_uid, "no push token registered");
        return false;
    };

    let message = homeboy_platform::PushMessage {
        token: token.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        data: data.clone(),
    };

    match state.push().send(&message).await {
        Ok(message_id) => {
            debug!(user_uid, %message_id, "push delivered");
            true
        }
        Err(error) => {
            warn!(user_uid, %error, "push delivery failed");
            false
        }
    }
}
