use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{
    ActionType, NewReport, Report, ReportStatus, ReportTarget, ReviewCommand, ReviewOutcome,
    TargetKind,
};
use crate::features::moderation::services::auto_moderation::AutoModerator;
use crate::features::moderation::services::notifier::ModerationNotifier;
use crate::features::moderation::store::{ReportSearchCriteria, ReportStore};
use crate::features::platform::{EnforcementExecutor, IdentityResolver};
use crate::shared::types::PaginationQuery;

/// Report lifecycle: filing, lookup, review, and deletion.
///
/// Filing and review both end with asynchronous side work (alerts,
/// auto-moderation, reporter fan-out) spawned after the durable write
/// commits, so a slow or failing collaborator never blocks or rolls back
/// the record itself.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    resolver: Arc<dyn IdentityResolver>,
    executor: Arc<dyn EnforcementExecutor>,
    notifier: Arc<ModerationNotifier>,
    auto_moderator: Arc<AutoModerator>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        resolver: Arc<dyn IdentityResolver>,
        executor: Arc<dyn EnforcementExecutor>,
        notifier: Arc<ModerationNotifier>,
        auto_moderator: Arc<AutoModerator>,
    ) -> Self {
        Self {
            store,
            resolver,
            executor,
            notifier,
            auto_moderator,
        }
    }

    /// File a report. The auto-moderation pass runs once the row is durable;
    /// its failure is logged and never undoes the report itself. The
    /// moderator alert goes out in the background.
    pub async fn create_report(&self, new: NewReport) -> Result<Report> {
        self.validate_target(new.reporter_id, new.target).await?;

        if self.store.has_pending_from(new.reporter_id, new.target).await? {
            return Err(AppError::Conflict(
                "You already have a pending report against this target".to_string(),
            ));
        }

        let report = self.store.insert(new).await?;

        if let Err(e) = self.auto_moderator.evaluate(report.target).await {
            tracing::error!("Auto-moderation pass failed for {}: {:?}", report.target, e);
        }

        let notifier = self.notifier.clone();
        let spawned = report.clone();
        tokio::spawn(async move {
            notifier.notify_admins_new_report(&spawned).await;
        });

        Ok(report)
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Report> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn search_reports(
        &self,
        criteria: &ReportSearchCriteria,
        page: &PaginationQuery,
    ) -> Result<(Vec<Report>, i64)> {
        self.store.search(criteria, page).await
    }

    pub async fn status_counts(&self) -> Result<HashMap<ReportStatus, i64>> {
        self.store.status_counts().await
    }

    /// Apply a moderator's decision. The store transitions the report and
    /// every sibling pending report on the same target atomically; only
    /// then does enforcement run, and fan-out is spawned last.
    pub async fn review_report(&self, id: Uuid, command: ReviewCommand) -> Result<ReviewOutcome> {
        let report = self.get_report(id).await?;
        validate_action(command.action, report.target.kind())?;

        let action = command.action;
        let outcome = self.store.review(id, command).await?;

        // The decision is committed at this point. A failed enforcement
        // write degrades to a log line; the backlog review catches it.
        let enforcement = match self.enforce(&outcome.report, action).await {
            Ok(enforcement) => enforcement,
            Err(e) => {
                tracing::error!(
                    "Enforcement {} failed after review of report {} committed: {:?}",
                    action,
                    outcome.report.id,
                    e
                );
                None
            }
        };

        let notifier = self.notifier.clone();
        let spawned = outcome.clone();
        tokio::spawn(async move {
            if let Some((owner_id, action)) = enforcement {
                notifier
                    .notify_owner_enforcement(owner_id, action, Some(spawned.report.id))
                    .await;
            }
            notifier.notify_reporters_review_complete(&spawned).await;
        });

        Ok(outcome)
    }

    /// Remove a report record outright. Used for retracting mistaken or
    /// abusive filings; reviews should go through `review_report`.
    pub async fn delete_report(&self, id: Uuid) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            notifier.broadcast_pending_count().await;
        });

        Ok(())
    }

    async fn validate_target(&self, reporter_id: Uuid, target: ReportTarget) -> Result<()> {
        match target {
            ReportTarget::User(user_id) => {
                if user_id == reporter_id {
                    return Err(AppError::Validation(
                        "You cannot report yourself".to_string(),
                    ));
                }
                let users = self.resolver.resolve_users(&[user_id]).await?;
                if !users.contains_key(&user_id) {
                    return Err(AppError::NotFound("Reported user not found".to_string()));
                }
            }
            ReportTarget::Recipe(recipe_id) => {
                let recipes = self.resolver.resolve_recipes(&[recipe_id]).await?;
                let recipe = recipes
                    .get(&recipe_id)
                    .ok_or_else(|| AppError::NotFound("Reported recipe not found".to_string()))?;
                if recipe.author_id == reporter_id {
                    return Err(AppError::Validation(
                        "You cannot report your own recipe".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Apply the platform-side effect of a review decision. Returns the
    /// owner to notify, or None when nothing notify-worthy happened.
    async fn enforce(
        &self,
        report: &Report,
        action: ActionType,
    ) -> Result<Option<(Uuid, ActionType)>> {
        match (action, report.target) {
            (ActionType::Dismiss, _) => Ok(None),
            // Warnings change no platform state but always reach the owner
            (ActionType::Warning, target) => {
                Ok(Some((self.owner_of(target).await?, ActionType::Warning)))
            }
            (ActionType::RequireEdit, ReportTarget::Recipe(recipe_id))
            | (ActionType::UnpublishRecipe, ReportTarget::Recipe(recipe_id)) => {
                let owner_id = self.owner_of(report.target).await?;
                let changed = self.executor.unpublish_to_draft(recipe_id).await?;
                Ok(changed.then_some((owner_id, action)))
            }
            (ActionType::RemoveContent, ReportTarget::Recipe(recipe_id)) => {
                let owner_id = self.owner_of(report.target).await?;
                let changed = self.executor.unpublish_recipe(recipe_id).await?;
                Ok(changed.then_some((owner_id, ActionType::RemoveContent)))
            }
            (ActionType::BanUser, ReportTarget::User(user_id)) => {
                let changed = self.executor.disable_user(user_id).await?;
                Ok(changed.then_some((user_id, ActionType::BanUser)))
            }
            // validate_action rejects these pairings before the store writes
            (action, target) => Err(AppError::Internal(format!(
                "Action {} applied to incompatible target {}",
                action, target
            ))),
        }
    }

    async fn owner_of(&self, target: ReportTarget) -> Result<Uuid> {
        match target {
            ReportTarget::User(user_id) => Ok(user_id),
            ReportTarget::Recipe(recipe_id) => {
                let recipes = self.resolver.resolve_recipes(&[recipe_id]).await?;
                recipes
                    .get(&recipe_id)
                    .map(|r| r.author_id)
                    .ok_or_else(|| AppError::NotFound("Reported recipe not found".to_string()))
            }
        }
    }
}

/// Reject action/target pairings that make no sense before anything is
/// written.
fn validate_action(action: ActionType, kind: TargetKind) -> Result<()> {
    let valid = match action {
        ActionType::Dismiss | ActionType::Warning => true,
        ActionType::RequireEdit | ActionType::UnpublishRecipe | ActionType::RemoveContent => {
            kind == TargetKind::Recipe
        }
        ActionType::BanUser => kind == TargetKind::User,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Action {} cannot be applied to a {} target",
            action, kind
        )))
    }
}
