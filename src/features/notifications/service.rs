use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::Notification;
use crate::shared::types::PaginationQuery;

/// Read/ack side of durable notifications
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's notifications, newest first.
    /// Returns (notifications, total_count)
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PaginationQuery,
    ) -> Result<(Vec<Notification>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count notifications: {:?}", e);
            AppError::Database(e)
        })?;

        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, body, kind, related_report_id, read, created_at \
             FROM notifications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             OFFSET $2 LIMIT $3",
        )
        .bind(user_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((notifications, total))
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = TRUE \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, title, body, kind, related_report_id, read, created_at",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification read: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }
}
