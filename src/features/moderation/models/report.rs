use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

/// Report type enum matching database enum
///
/// Declaration order is the severity tie-break order: when two types share
/// the same weight and count, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Spam,
    Inappropriate,
    Copyright,
    Harassment,
    Fake,
    Misleading,
    Other,
}

impl ReportType {
    /// All variants in declaration order
    pub const ALL: [ReportType; 7] = [
        ReportType::Spam,
        ReportType::Inappropriate,
        ReportType::Copyright,
        ReportType::Harassment,
        ReportType::Fake,
        ReportType::Misleading,
        ReportType::Other,
    ];
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportType::Spam => write!(f, "spam"),
            ReportType::Inappropriate => write!(f, "inappropriate"),
            ReportType::Copyright => write!(f, "copyright"),
            ReportType::Harassment => write!(f, "harassment"),
            ReportType::Fake => write!(f, "fake"),
            ReportType::Misleading => write!(f, "misleading"),
            ReportType::Other => write!(f, "other"),
        }
    }
}

/// Report lifecycle status matching database enum
///
/// Pending is the initial state; the other three are terminal and a report
/// never leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
    Resolved,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::Approved => write!(f, "approved"),
            ReportStatus::Rejected => write!(f, "rejected"),
            ReportStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Enforcement action vocabulary, shared by manual review and auto-moderation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "moderation_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Dismiss,
    Warning,
    RequireEdit,
    UnpublishRecipe,
    RemoveContent,
    BanUser,
}

impl ActionType {
    /// Total map from action to the terminal status it produces.
    ///
    /// The reviewer picks an action, never a status, so the recorded outcome
    /// can never contradict the action taken.
    pub fn resulting_status(self) -> ReportStatus {
        match self {
            ActionType::Dismiss => ReportStatus::Rejected,
            ActionType::Warning => ReportStatus::Approved,
            ActionType::RequireEdit => ReportStatus::Approved,
            ActionType::UnpublishRecipe => ReportStatus::Resolved,
            ActionType::RemoveContent => ReportStatus::Resolved,
            ActionType::BanUser => ReportStatus::Resolved,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Dismiss => write!(f, "dismiss"),
            ActionType::Warning => write!(f, "warning"),
            ActionType::RequireEdit => write!(f, "require_edit"),
            ActionType::UnpublishRecipe => write!(f, "unpublish_recipe"),
            ActionType::RemoveContent => write!(f, "remove_content"),
            ActionType::BanUser => write!(f, "ban_user"),
        }
    }
}

/// Kind of entity a report accuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    User,
    Recipe,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::User => write!(f, "user"),
            TargetKind::Recipe => write!(f, "recipe"),
        }
    }
}

/// The (kind, id) pair a group of reports accuses.
///
/// A report targets either a user account or a recipe, never both; the
/// relational row keeps two nullable columns with a CHECK constraint and the
/// store converts at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportTarget {
    User(Uuid),
    Recipe(Uuid),
}

impl ReportTarget {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::User => ReportTarget::User(id),
            TargetKind::Recipe => ReportTarget::Recipe(id),
        }
    }

    pub fn kind(self) -> TargetKind {
        match self {
            ReportTarget::User(_) => TargetKind::User,
            ReportTarget::Recipe(_) => TargetKind::Recipe,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            ReportTarget::User(id) | ReportTarget::Recipe(id) => id,
        }
    }
}

impl std::fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Count of pending reports per type for one target, recomputed on demand
pub type ReportTypeBreakdown = HashMap<ReportType, i64>;

/// Derived severity summary for one target's pending reports
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationScore {
    pub weighted_score: f64,
    pub most_severe_type: Option<ReportType>,
    pub total_count: i64,
}

/// Display priority bucket for the moderation queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Total order used for sorting only (critical > high > medium > low)
    pub fn order(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Critical => 3,
        }
    }
}

/// Domain model for a report
#[derive(Debug, Clone)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target: ReportTarget,
    pub report_type: ReportType,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub action_taken: Option<ActionType>,
    pub action_description: Option<String>,
    pub admin_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reporters_notified: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for filing a new report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub target: ReportTarget,
    pub report_type: ReportType,
    pub reason: String,
    pub description: Option<String>,
}

/// A reviewer's decision on a pending report
#[derive(Debug, Clone)]
pub struct ReviewCommand {
    pub action: ActionType,
    pub admin_note: Option<String>,
    pub action_description: Option<String>,
    pub reviewed_by: Uuid,
}

/// Result of applying a review: the reviewed report plus every other pending
/// report on the same target that was synchronized to the same terminal state
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub report: Report,
    pub synced: Vec<Report>,
}

impl ReviewOutcome {
    /// The reviewed report and its synced siblings, in one iterator
    pub fn all_reports(&self) -> impl Iterator<Item = &Report> {
        std::iter::once(&self.report).chain(self.synced.iter())
    }
}

/// One aggregation row from the pending backlog: a target plus how many
/// pending reports accuse it
#[derive(Debug, Clone)]
pub struct PendingGroup {
    pub target: ReportTarget,
    pub report_count: i64,
    pub latest_report_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_status_map_is_total_and_terminal() {
        let actions = [
            ActionType::Dismiss,
            ActionType::Warning,
            ActionType::RequireEdit,
            ActionType::UnpublishRecipe,
            ActionType::RemoveContent,
            ActionType::BanUser,
        ];

        for action in actions {
            assert!(action.resulting_status().is_terminal());
        }
    }

    #[test]
    fn remove_content_resolves() {
        assert_eq!(
            ActionType::RemoveContent.resulting_status(),
            ReportStatus::Resolved
        );
    }

    #[test]
    fn dismiss_rejects() {
        assert_eq!(ActionType::Dismiss.resulting_status(), ReportStatus::Rejected);
    }

    #[test]
    fn pending_is_not_terminal() {
        assert!(!ReportStatus::Pending.is_terminal());
        assert!(ReportStatus::Approved.is_terminal());
        assert!(ReportStatus::Rejected.is_terminal());
        assert!(ReportStatus::Resolved.is_terminal());
    }

    #[test]
    fn target_roundtrip() {
        let id = Uuid::new_v4();
        let target = ReportTarget::new(TargetKind::Recipe, id);
        assert_eq!(target.kind(), TargetKind::Recipe);
        assert_eq!(target.id(), id);
    }
}
