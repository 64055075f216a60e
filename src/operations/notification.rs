use uuid::Uuid;

use crate::database::Store;
use crate::error::{AppError, Result};
use crate::models::{Identity, Notification, NotificationView};

const NOTIFICATION_LIMIT: i64 = 50;

pub async fn list_notifications(
    store: &dyn Store,
    caller: &Identity,
) -> Result<Vec<NotificationView>> {
    store.list_notifications(caller.id, NOTIFICATION_LIMIT).await
}

/// `read` only ever goes from false to true; `read = false` leaves the
/// notification as it is.
pub async fn mark_notification_read(
    store: &dyn Store,
    caller: &Identity,
    notification_id: Uuid,
    read: bool,
) -> Result<Notification> {
    let mut notification = store
        .find_notification(notification_id)
        .await?
        .filter(|n| n.to_user_id == caller.id)
        .ok_or(AppError::NotFound("notification"))?;

    if read && !notification.read {
        store.mark_notification_read(notification_id).await?;
        notification.read = true;
    }
    Ok(notification)
}
