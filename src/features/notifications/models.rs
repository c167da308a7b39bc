use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Notification kind enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A report the recipient filed has been reviewed
    ReportReviewed,
    /// A new report was filed (moderator summary)
    ReportFiled,
    /// An enforcement action was applied to the recipient's account/content
    EnforcementNotice,
    /// Moderation backlog size changed (moderator signal)
    PendingCount,
}

/// Durable notification record owned by this service
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub related_report_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for persisting a new notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub related_report_id: Option<Uuid>,
}

/// Realtime payload pushed over the in-process hub
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutboundMessage {
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub related_report_id: Option<Uuid>,
}
