use std::sync::Arc;

use crate::core::config::ModerationConfig;
use crate::core::error::Result;
use crate::features::moderation::models::{ActionType, ReportTarget};
use crate::features::moderation::services::notifier::ModerationNotifier;
use crate::features::moderation::services::severity::ScoreCalculator;
use crate::features::moderation::store::ReportStore;
use crate::features::platform::{EnforcementExecutor, IdentityResolver};

/// What an auto-moderation pass decided for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoModerationOutcome {
    /// Auto-enforcement is switched off
    Disabled,
    /// Weighted score is below the threshold for this target kind
    BelowThreshold,
    /// Threshold crossed but the target was already in the enforced state
    AlreadyEnforced,
    /// Threshold crossed and enforcement was applied now
    Enforced(ActionType),
}

/// Threshold-triggered automatic enforcement.
///
/// Runs after each report is filed. A user target past its threshold is
/// disabled; a recipe past its threshold is unpublished back to draft so
/// the author can fix and resubmit. Reports stay pending either way: a
/// human review still closes the group, and the review's own enforcement
/// is idempotent against what happened here.
///
/// Concurrent evaluations of the same target are harmless. Each one reads
/// the pending counts fresh and the executor reports whether it actually
/// changed state, so only the evaluation that flips the target notifies
/// the owner.
pub struct AutoModerator {
    store: Arc<dyn ReportStore>,
    resolver: Arc<dyn IdentityResolver>,
    executor: Arc<dyn EnforcementExecutor>,
    notifier: Arc<ModerationNotifier>,
    calculator: ScoreCalculator,
    enabled: bool,
}

impl AutoModerator {
    pub fn new(
        store: Arc<dyn ReportStore>,
        resolver: Arc<dyn IdentityResolver>,
        executor: Arc<dyn EnforcementExecutor>,
        notifier: Arc<ModerationNotifier>,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            executor,
            notifier,
            calculator: ScoreCalculator::new(config),
            enabled: config.auto_enforcement_enabled,
        }
    }

    /// Re-score a target's pending reports and enforce when the threshold
    /// is crossed.
    pub async fn evaluate(&self, target: ReportTarget) -> Result<AutoModerationOutcome> {
        if !self.enabled {
            return Ok(AutoModerationOutcome::Disabled);
        }

        let breakdown = self.store.breakdown_for_target(target).await?;
        let score = self.calculator.score(&breakdown);

        if !self
            .calculator
            .exceeds_threshold(score.weighted_score, target.kind())
        {
            return Ok(AutoModerationOutcome::BelowThreshold);
        }

        let (action, owner_id, changed) = match target {
            ReportTarget::User(user_id) => {
                let changed = self.executor.disable_user(user_id).await?;
                (ActionType::BanUser, user_id, changed)
            }
            ReportTarget::Recipe(recipe_id) => {
                let changed = self.executor.unpublish_to_draft(recipe_id).await?;
                let recipes = self.resolver.resolve_recipes(&[recipe_id]).await?;
                let owner_id = match recipes.get(&recipe_id) {
                    Some(recipe) => recipe.author_id,
                    // Recipe vanished between scoring and enforcement
                    None => return Ok(AutoModerationOutcome::AlreadyEnforced),
                };
                (ActionType::UnpublishRecipe, owner_id, changed)
            }
        };

        if !changed {
            return Ok(AutoModerationOutcome::AlreadyEnforced);
        }

        tracing::info!(
            "Auto-enforcement applied {} to {} (score {:.1}, {} pending reports)",
            action,
            target,
            score.weighted_score,
            score.total_count
        );

        self.notifier
            .notify_owner_auto_action(owner_id, action, &score)
            .await;

        Ok(AutoModerationOutcome::Enforced(action))
    }
}
