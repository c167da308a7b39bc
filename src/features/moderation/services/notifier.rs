use std::sync::Arc;

use uuid::Uuid;

use crate::features::moderation::models::{
    ActionType, ModerationScore, Report, ReportStatus, ReviewOutcome,
};
use crate::features::moderation::store::ReportStore;
use crate::features::notifications::{
    NewNotification, NotificationKind, NotificationTransport, OutboundMessage,
};
use crate::features::platform::IdentityResolver;

/// Fan-out side of moderation: tells moderators about new work and tells
/// reporters and content owners about outcomes.
///
/// Every method is best-effort. Failures are logged and swallowed so a
/// notification problem can never roll back or fail the moderation
/// decision that triggered it.
pub struct ModerationNotifier {
    store: Arc<dyn ReportStore>,
    resolver: Arc<dyn IdentityResolver>,
    transport: Arc<dyn NotificationTransport>,
}

impl ModerationNotifier {
    pub fn new(
        store: Arc<dyn ReportStore>,
        resolver: Arc<dyn IdentityResolver>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self {
            store,
            resolver,
            transport,
        }
    }

    /// Alert every active moderator that a report was filed, then refresh
    /// their pending-count badge.
    pub async fn notify_admins_new_report(&self, report: &Report) {
        let message = OutboundMessage {
            title: "New report filed".to_string(),
            body: format!(
                "A {} report was filed against {}",
                report.report_type, report.target
            ),
            kind: NotificationKind::ReportFiled,
            related_report_id: Some(report.id),
        };

        let moderators = match self.resolver.moderator_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Skipping moderator alert, lookup failed: {:?}", e);
                return;
            }
        };

        for moderator_id in &moderators {
            if let Err(e) = self
                .transport
                .persist(NewNotification::from_message(*moderator_id, &message))
                .await
            {
                tracing::warn!(
                    "Failed to persist moderator alert for {}: {:?}",
                    moderator_id,
                    e
                );
            }
        }

        if let Err(e) = self.transport.broadcast(&moderators, &message).await {
            tracing::warn!("Failed to push moderator alert: {:?}", e);
        }

        self.broadcast_pending_count().await;
    }

    /// Tell every reporter in a reviewed group what happened to their
    /// report, once. Reports already flagged as notified are skipped and
    /// the flag is set only for those actually delivered to the store.
    pub async fn notify_reporters_review_complete(&self, outcome: &ReviewOutcome) {
        let mut notified_ids = Vec::new();

        for report in outcome.all_reports() {
            if report.reporters_notified {
                continue;
            }

            let message = OutboundMessage {
                title: "Your report has been reviewed".to_string(),
                body: reporter_outcome_body(report),
                kind: NotificationKind::ReportReviewed,
                related_report_id: Some(report.id),
            };

            match self
                .transport
                .persist(NewNotification::from_message(report.reporter_id, &message))
                .await
            {
                Ok(_) => {
                    notified_ids.push(report.id);
                    if let Err(e) = self
                        .transport
                        .send_to_user(report.reporter_id, &message)
                        .await
                    {
                        tracing::warn!(
                            "Failed to push review outcome to reporter {}: {:?}",
                            report.reporter_id,
                            e
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to persist review outcome for report {}: {:?}",
                        report.id,
                        e
                    );
                }
            }
        }

        if !notified_ids.is_empty() {
            if let Err(e) = self.store.mark_reporters_notified(&notified_ids).await {
                tracing::warn!("Failed to flag notified reports: {:?}", e);
            }
        }

        self.broadcast_pending_count().await;
    }

    /// Tell an owner that the automatic threshold tripped on their account
    /// or content. Advisory only; the enforcement itself already happened.
    pub async fn notify_owner_auto_action(
        &self,
        owner_id: Uuid,
        action: ActionType,
        score: &ModerationScore,
    ) {
        let cause = match score.most_severe_type {
            Some(report_type) => format!(
                "{} pending reports, mostly for {}",
                score.total_count, report_type
            ),
            None => format!("{} pending reports", score.total_count),
        };
        let message = OutboundMessage {
            title: "Moderation action on your content".to_string(),
            body: format!("{} Cause: {}.", enforcement_body(action), cause),
            kind: NotificationKind::EnforcementNotice,
            related_report_id: None,
        };

        if let Err(e) = self
            .transport
            .persist(NewNotification::from_message(owner_id, &message))
            .await
        {
            tracing::warn!(
                "Failed to persist auto-action notice for {}: {:?}",
                owner_id,
                e
            );
        }
        if let Err(e) = self.transport.send_to_user(owner_id, &message).await {
            tracing::warn!("Failed to push auto-action notice to {}: {:?}", owner_id, e);
        }
    }

    /// Tell a user that enforcement was applied to their account or content
    pub async fn notify_owner_enforcement(
        &self,
        owner_id: Uuid,
        action: ActionType,
        report_id: Option<Uuid>,
    ) {
        let message = OutboundMessage {
            title: "Moderation action on your content".to_string(),
            body: enforcement_body(action),
            kind: NotificationKind::EnforcementNotice,
            related_report_id: report_id,
        };

        if let Err(e) = self
            .transport
            .persist(NewNotification::from_message(owner_id, &message))
            .await
        {
            tracing::warn!(
                "Failed to persist enforcement notice for {}: {:?}",
                owner_id,
                e
            );
        }
        if let Err(e) = self.transport.send_to_user(owner_id, &message).await {
            tracing::warn!("Failed to push enforcement notice to {}: {:?}", owner_id, e);
        }
    }

    /// Realtime-only badge refresh for moderators. Never persisted: the
    /// count is derivable and stale copies would just accumulate.
    pub async fn broadcast_pending_count(&self) {
        let count = match self.store.count_by_status(ReportStatus::Pending).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Skipping pending-count push, count failed: {:?}", e);
                return;
            }
        };

        let moderators = match self.resolver.moderator_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Skipping pending-count push, lookup failed: {:?}", e);
                return;
            }
        };

        let message = OutboundMessage {
            title: "Pending reports".to_string(),
            body: count.to_string(),
            kind: NotificationKind::PendingCount,
            related_report_id: None,
        };

        if let Err(e) = self.transport.broadcast(&moderators, &message).await {
            tracing::warn!("Failed to push pending count: {:?}", e);
        }
    }
}

fn reporter_outcome_body(report: &Report) -> String {
    match report.action_taken {
        Some(ActionType::Dismiss) => {
            "Your report was reviewed and no action was taken.".to_string()
        }
        Some(action) => format!(
            "Your report was reviewed and action was taken: {}.",
            action
        ),
        None => "Your report has been reviewed.".to_string(),
    }
}

fn enforcement_body(action: ActionType) -> String {
    match action {
        ActionType::Warning => {
            "You have received a warning following a moderation review.".to_string()
        }
        ActionType::RequireEdit => {
            "Your recipe was unpublished and requires edits before it can be republished."
                .to_string()
        }
        ActionType::UnpublishRecipe => {
            "Your recipe was unpublished following a moderation review.".to_string()
        }
        ActionType::RemoveContent => {
            "Your content was removed following a moderation review.".to_string()
        }
        ActionType::BanUser => {
            "Your account has been disabled following a moderation review.".to_string()
        }
        ActionType::Dismiss => "A moderation review concluded with no action.".to_string(),
    }
}
