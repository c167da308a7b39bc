use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Display data for a user account
#[derive(Debug, Clone)]
pub struct UserRef {
    pub username: String,
    pub avatar_path: Option<String>,
}

/// Display data for a recipe
#[derive(Debug, Clone)]
pub struct RecipeRef {
    pub title: String,
    pub author_id: Uuid,
    pub thumbnail_path: Option<String>,
}

/// Batched lookup of user/recipe display data and the active moderator set
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_users(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserRef>>;

    async fn resolve_recipes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, RecipeRef>>;

    /// Ids of every active account allowed to moderate
    async fn moderator_ids(&self) -> Result<Vec<Uuid>>;
}

/// Resolver over the platform's own users/recipes tables
pub struct PgIdentityResolver {
    pool: PgPool,
}

impl PgIdentityResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve_users(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
            "SELECT id, username, avatar_url FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, username, avatar_path)| {
                (
                    id,
                    UserRef {
                        username,
                        avatar_path,
                    },
                )
            })
            .collect())
    }

    async fn resolve_recipes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, RecipeRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, String, Uuid, Option<String>)>(
            "SELECT id, title, author_id, image_url FROM recipes WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve recipes: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, title, author_id, thumbnail_path)| {
                (
                    id,
                    RecipeRef {
                        title,
                        author_id,
                        thumbnail_path,
                    },
                )
            })
            .collect())
    }

    async fn moderator_ids(&self) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE role IN ('moderator', 'admin') AND NOT disabled",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve moderator ids: {:?}", e);
            AppError::Database(e)
        })
    }
}
