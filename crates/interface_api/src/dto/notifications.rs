//! Notification DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use domain_notifications::NotificationView;

/// A notification as the caller sees it; other recipients are not exposed
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_module: String,
    pub related_entity_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationView> for NotificationResponse {
    fn from(view: NotificationView) -> Self {
        let n = view.notification;
        Self {
            id: *n.id.as_uuid(),
            title: n.title,
            message: n.message,
            notification_type: n.notification_type.as_str().to_string(),
            related_module: n.related_module,
            related_entity_id: n.related_entity_id,
            is_read: view.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
