use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Enforcement writes against platform-owned entities.
///
/// Every method is idempotent and returns whether it actually changed state:
/// manual review and auto-moderation share this path, and concurrent
/// submissions may both decide to enforce, so re-applying an action against
/// an already-enforced entity must be a no-op.
#[async_trait]
pub trait EnforcementExecutor: Send + Sync {
    /// Disable a user account (reversible by a platform admin)
    async fn disable_user(&self, user_id: Uuid) -> Result<bool>;

    /// Remove a recipe from public view entirely
    async fn unpublish_recipe(&self, recipe_id: Uuid) -> Result<bool>;

    /// Demote a published recipe back to draft so the author can fix it
    async fn unpublish_to_draft(&self, recipe_id: Uuid) -> Result<bool>;
}

/// Executor over the platform's users/recipes tables
pub struct PgEnforcementExecutor {
    pool: PgPool,
}

impl PgEnforcementExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnforcementExecutor for PgEnforcementExecutor {
    async fn disable_user(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET disabled = TRUE WHERE id = $1 AND NOT disabled")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to disable user {}: {:?}", user_id, e);
                AppError::Database(e)
            })?;

        let changed = result.rows_affected() > 0;
        if changed {
            tracing::info!("Disabled user account {}", user_id);
        }
        Ok(changed)
    }

    async fn unpublish_recipe(&self, recipe_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE recipes SET status = 'removed' WHERE id = $1 AND status <> 'removed'")
                .bind(recipe_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to remove recipe {}: {:?}", recipe_id, e);
                    AppError::Database(e)
                })?;

        let changed = result.rows_affected() > 0;
        if changed {
            tracing::info!("Removed recipe {}", recipe_id);
        }
        Ok(changed)
    }

    async fn unpublish_to_draft(&self, recipe_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE recipes SET status = 'draft' WHERE id = $1 AND status = 'published'")
                .bind(recipe_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to unpublish recipe {}: {:?}", recipe_id, e);
                    AppError::Database(e)
                })?;

        let changed = result.rows_affected() > 0;
        if changed {
            tracing::info!("Unpublished recipe {} to draft", recipe_id);
        }
        Ok(changed)
    }
}
