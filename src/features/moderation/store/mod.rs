pub mod pg;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::moderation::models::{
    NewReport, PendingGroup, Report, ReportStatus, ReportTarget, ReportType, ReportTypeBreakdown,
    ReviewCommand, ReviewOutcome, TargetKind,
};
use crate::shared::types::PaginationQuery;

pub use pg::PgReportStore;

/// Filters for the admin report search
#[derive(Debug, Clone, Default)]
pub struct ReportSearchCriteria {
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
    pub target_kind: Option<TargetKind>,
    pub reporter_id: Option<Uuid>,
}

/// Durable log of individual report records.
///
/// The only mutable shared resource in the moderation core; every mutating
/// operation is one transactional unit in the backing store.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, new: NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    async fn find_pending_by_target(&self, target: ReportTarget) -> Result<Vec<Report>>;

    async fn find_all_by_target(&self, target: ReportTarget) -> Result<Vec<Report>>;

    /// Whether this reporter already has a pending report against the target
    async fn has_pending_from(&self, reporter_id: Uuid, target: ReportTarget) -> Result<bool>;

    async fn count_by_status(&self, status: ReportStatus) -> Result<i64>;

    /// Count per lifecycle status, zero-filled for absent statuses
    async fn status_counts(&self) -> Result<HashMap<ReportStatus, i64>>;

    /// Hard delete; returns false when the report does not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn search(
        &self,
        criteria: &ReportSearchCriteria,
        page: &PaginationQuery,
    ) -> Result<(Vec<Report>, i64)>;

    /// One row per distinct target with at least one pending report,
    /// newest activity first
    async fn list_pending_groups(&self) -> Result<Vec<PendingGroup>>;

    /// Pending per-type counts for one target, in a single read
    async fn breakdown_for_target(&self, target: ReportTarget) -> Result<ReportTypeBreakdown>;

    /// Pending per-type counts for many targets in one grouped query
    async fn breakdowns_for_targets(
        &self,
        targets: &[ReportTarget],
    ) -> Result<HashMap<ReportTarget, ReportTypeBreakdown>>;

    /// Most recent distinct reporter ids per target, capped at `limit`
    async fn top_reporter_ids(
        &self,
        targets: &[ReportTarget],
        limit: i64,
    ) -> Result<HashMap<ReportTarget, Vec<Uuid>>>;

    /// Apply a review decision to one pending report and synchronize every
    /// other pending report on the same target to the same terminal state,
    /// atomically. Fails with AlreadyReviewed when the report is terminal
    /// and NotFound when it does not exist.
    async fn review(&self, id: Uuid, command: ReviewCommand) -> Result<ReviewOutcome>;

    /// Flag reports whose reporter fan-out has completed
    async fn mark_reporters_notified(&self, report_ids: &[Uuid]) -> Result<()>;
}
