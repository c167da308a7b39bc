use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::notifications::models::{Notification, NotificationKind};

/// Response DTO for a durable notification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub related_report_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            body: n.body,
            kind: n.kind,
            related_report_id: n.related_report_id,
            read: n.read,
            created_at: n.created_at,
        }
    }
}
