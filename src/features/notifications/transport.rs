use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::hub::RealtimeHub;
use crate::features::notifications::models::{NewNotification, Notification, OutboundMessage};

/// Delivery seam for moderation fan-out.
///
/// `persist` is the durable path; `send_to_user`/`broadcast` are
/// best-effort realtime pushes whose failure never affects a durable
/// record.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn persist(&self, new: NewNotification) -> Result<Notification>;

    async fn send_to_user(&self, user_id: Uuid, message: &OutboundMessage) -> Result<()>;

    async fn broadcast(&self, user_ids: &[Uuid], message: &OutboundMessage) -> Result<()>;
}

/// Production transport: Postgres for durable records, the in-process hub
/// for realtime pushes
pub struct AppNotificationTransport {
    pool: PgPool,
    hub: RealtimeHub,
}

impl AppNotificationTransport {
    pub fn new(pool: PgPool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }
}

#[async_trait]
impl NotificationTransport for AppNotificationTransport {
    async fn persist(&self, new: NewNotification) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, title, body, kind, related_report_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, title, body, kind, related_report_id, read, created_at",
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.kind)
        .bind(new.related_report_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist notification: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn send_to_user(&self, user_id: Uuid, message: &OutboundMessage) -> Result<()> {
        self.hub.publish(vec![user_id], message.clone());
        Ok(())
    }

    async fn broadcast(&self, user_ids: &[Uuid], message: &OutboundMessage) -> Result<()> {
        if !user_ids.is_empty() {
            self.hub.publish(user_ids.to_vec(), message.clone());
        }
        Ok(())
    }
}

impl NewNotification {
    /// Durable record carrying the same content as a realtime message
    pub fn from_message(user_id: Uuid, message: &OutboundMessage) -> Self {
        Self {
            user_id,
            title: message.title.clone(),
            body: message.body.clone(),
            kind: message.kind,
            related_report_id: message.related_report_id,
        }
    }
}
