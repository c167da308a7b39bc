//! In-memory doubles for the moderation service seams, test builds only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{
    NewReport, PendingGroup, Report, ReportStatus, ReportTarget, ReportType, ReportTypeBreakdown,
    ReviewCommand, ReviewOutcome,
};
use crate::features::moderation::store::{ReportSearchCriteria, ReportStore};
use crate::features::notifications::{
    NewNotification, Notification, NotificationTransport, OutboundMessage,
};
use crate::features::platform::{
    AssetUrlResolver, EnforcementExecutor, IdentityResolver, RecipeRef, UserRef,
};
use crate::shared::types::PaginationQuery;

/// Report store over a mutex-guarded Vec, mirroring the transactional
/// semantics of the Postgres store.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: Mutex<Vec<Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending report directly, bypassing service validation
    pub async fn seed_pending(
        &self,
        reporter_id: Uuid,
        target: ReportTarget,
        report_type: ReportType,
    ) -> Report {
        let report = Report {
            id: Uuid::new_v4(),
            reporter_id,
            target,
            report_type,
            reason: "seeded report".to_string(),
            description: None,
            status: ReportStatus::Pending,
            action_taken: None,
            action_description: None,
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            reporters_notified: false,
            created_at: Utc::now(),
        };
        self.reports.lock().await.push(report.clone());
        report
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn insert(&self, new: NewReport) -> Result<Report> {
        let report = Report {
            id: Uuid::new_v4(),
            reporter_id: new.reporter_id,
            target: new.target,
            report_type: new.report_type,
            reason: new.reason,
            description: new.description,
            status: ReportStatus::Pending,
            action_taken: None,
            action_description: None,
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            reporters_notified: false,
            created_at: Utc::now(),
        };
        self.reports.lock().await.push(report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.lock().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_by_target(&self, target: ReportTarget) -> Result<Vec<Report>> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .filter(|r| r.target == target && r.status == ReportStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_all_by_target(&self, target: ReportTarget) -> Result<Vec<Report>> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect())
    }

    async fn has_pending_from(&self, reporter_id: Uuid, target: ReportTarget) -> Result<bool> {
        Ok(self.reports.lock().await.iter().any(|r| {
            r.reporter_id == reporter_id
                && r.target == target
                && r.status == ReportStatus::Pending
        }))
    }

    async fn count_by_status(&self, status: ReportStatus) -> Result<i64> {
        Ok(self
            .reports
            .lock()
            .await
            .iter()
            .filter(|r| r.status == status)
            .count() as i64)
    }

    async fn status_counts(&self) -> Result<HashMap<ReportStatus, i64>> {
        let mut counts = HashMap::new();
        for report in self.reports.lock().await.iter() {
            *counts.entry(report.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut reports = self.reports.lock().await;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        Ok(reports.len() < before)
    }

    async fn search(
        &self,
        criteria: &ReportSearchCriteria,
        page: &PaginationQuery,
    ) -> Result<(Vec<Report>, i64)> {
        let reports = self.reports.lock().await;
        let matching: Vec<Report> = reports
            .iter()
            .filter(|r| {
                criteria.status.map_or(true, |s| r.status == s)
                    && criteria.report_type.map_or(true, |t| r.report_type == t)
                    && criteria.target_kind.map_or(true, |k| r.target.kind() == k)
                    && criteria.reporter_id.map_or(true, |id| r.reporter_id == id)
            })
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let start = (page.offset() as usize).min(matching.len());
        let end = (start + page.limit() as usize).min(matching.len());
        Ok((matching[start..end].to_vec(), total))
    }

    async fn list_pending_groups(&self) -> Result<Vec<PendingGroup>> {
        let reports = self.reports.lock().await;
        let mut groups: HashMap<ReportTarget, PendingGroup> = HashMap::new();
        for report in reports.iter().filter(|r| r.status == ReportStatus::Pending) {
            let group = groups.entry(report.target).or_insert(PendingGroup {
                target: report.target,
                report_count: 0,
                latest_report_at: report.created_at,
            });
            group.report_count += 1;
            group.latest_report_at = group.latest_report_at.max(report.created_at);
        }
        let mut groups: Vec<PendingGroup> = groups.into_values().collect();
        groups.sort_by(|a, b| b.latest_report_at.cmp(&a.latest_report_at));
        Ok(groups)
    }

    async fn breakdown_for_target(&self, target: ReportTarget) -> Result<ReportTypeBreakdown> {
        let mut breakdown = ReportTypeBreakdown::new();
        for report in self
            .reports
            .lock()
            .await
            .iter()
            .filter(|r| r.target == target && r.status == ReportStatus::Pending)
        {
            *breakdown.entry(report.report_type).or_insert(0) += 1;
        }
        Ok(breakdown)
    }

    async fn breakdowns_for_targets(
        &self,
        targets: &[ReportTarget],
    ) -> Result<HashMap<ReportTarget, ReportTypeBreakdown>> {
        let mut result = HashMap::new();
        for target in targets {
            result.insert(*target, self.breakdown_for_target(*target).await?);
        }
        Ok(result)
    }

    async fn top_reporter_ids(
        &self,
        targets: &[ReportTarget],
        limit: i64,
    ) -> Result<HashMap<ReportTarget, Vec<Uuid>>> {
        let reports = self.reports.lock().await;
        let mut result = HashMap::new();
        for target in targets {
            let mut pending: Vec<&Report> = reports
                .iter()
                .filter(|r| r.target == *target && r.status == ReportStatus::Pending)
                .collect();
            pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let mut ids = Vec::new();
            for report in pending {
                if !ids.contains(&report.reporter_id) {
                    ids.push(report.reporter_id);
                }
                if ids.len() as i64 >= limit {
                    break;
                }
            }
            result.insert(*target, ids);
        }
        Ok(result)
    }

    async fn review(&self, id: Uuid, command: ReviewCommand) -> Result<ReviewOutcome> {
        let mut reports = self.reports.lock().await;
        let target;
        let status = command.action.resulting_status();
        let now = Utc::now();

        {
            let report = reports
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
            if report.status.is_terminal() {
                return Err(AppError::AlreadyReviewed);
            }
            target = report.target;
            report.status = status;
            report.action_taken = Some(command.action);
            report.action_description = command.action_description.clone();
            report.admin_note = command.admin_note.clone();
            report.reviewed_by = Some(command.reviewed_by);
            report.reviewed_at = Some(now);
        }

        let mut synced = Vec::new();
        for report in reports
            .iter_mut()
            .filter(|r| r.id != id && r.target == target && r.status == ReportStatus::Pending)
        {
            report.status = status;
            report.action_taken = Some(command.action);
            report.reviewed_by = Some(command.reviewed_by);
            report.reviewed_at = Some(now);
            synced.push(report.clone());
        }

        let report = reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::Internal("Reviewed report vanished".to_string()))?;

        Ok(ReviewOutcome { report, synced })
    }

    async fn mark_reporters_notified(&self, report_ids: &[Uuid]) -> Result<()> {
        let mut reports = self.reports.lock().await;
        for report in reports.iter_mut().filter(|r| report_ids.contains(&r.id)) {
            report.reporters_notified = true;
        }
        Ok(())
    }
}

/// Identity resolver over fixed maps
#[derive(Default)]
pub struct StaticIdentityResolver {
    users: HashMap<Uuid, UserRef>,
    recipes: HashMap<Uuid, RecipeRef>,
    moderators: Vec<Uuid>,
}

impl StaticIdentityResolver {
    pub fn add_user(&mut self, id: Uuid, user: UserRef) {
        self.users.insert(id, user);
    }

    pub fn add_recipe(&mut self, id: Uuid, recipe: RecipeRef) {
        self.recipes.insert(id, recipe);
    }

    pub fn set_moderators(&mut self, ids: Vec<Uuid>) {
        self.moderators = ids;
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn resolve_users(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserRef>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }

    async fn resolve_recipes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, RecipeRef>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.recipes.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    async fn moderator_ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.moderators.clone())
    }
}

/// Enforcement double that records targets and reports idempotence the way
/// the guarded SQL updates do: first call changes state, repeats do not.
#[derive(Default)]
pub struct RecordingEnforcement {
    disabled: Mutex<Vec<Uuid>>,
    removed: Mutex<Vec<Uuid>>,
    drafted: Mutex<Vec<Uuid>>,
}

impl RecordingEnforcement {
    pub async fn disabled_users(&self) -> Vec<Uuid> {
        self.disabled.lock().await.clone()
    }

    pub async fn removed_recipes(&self) -> Vec<Uuid> {
        self.removed.lock().await.clone()
    }

    pub async fn drafted_recipes(&self) -> Vec<Uuid> {
        self.drafted.lock().await.clone()
    }

    async fn record(list: &Mutex<Vec<Uuid>>, id: Uuid) -> bool {
        let mut list = list.lock().await;
        if list.contains(&id) {
            false
        } else {
            list.push(id);
            true
        }
    }
}

#[async_trait]
impl EnforcementExecutor for RecordingEnforcement {
    async fn disable_user(&self, user_id: Uuid) -> Result<bool> {
        Ok(Self::record(&self.disabled, user_id).await)
    }

    async fn unpublish_recipe(&self, recipe_id: Uuid) -> Result<bool> {
        Ok(Self::record(&self.removed, recipe_id).await)
    }

    async fn unpublish_to_draft(&self, recipe_id: Uuid) -> Result<bool> {
        Ok(Self::record(&self.drafted, recipe_id).await)
    }
}

/// Enforcement double whose every write fails, for exercising degradation
pub struct FailingEnforcement;

#[async_trait]
impl EnforcementExecutor for FailingEnforcement {
    async fn disable_user(&self, _user_id: Uuid) -> Result<bool> {
        Err(AppError::Internal("enforcement store unavailable".to_string()))
    }

    async fn unpublish_recipe(&self, _recipe_id: Uuid) -> Result<bool> {
        Err(AppError::Internal("enforcement store unavailable".to_string()))
    }

    async fn unpublish_to_draft(&self, _recipe_id: Uuid) -> Result<bool> {
        Err(AppError::Internal("enforcement store unavailable".to_string()))
    }
}

/// Transport double that records durable writes and realtime pushes
#[derive(Default)]
pub struct RecordingTransport {
    persisted: Mutex<Vec<NewNotification>>,
    sent: Mutex<Vec<(Uuid, OutboundMessage)>>,
    broadcasts: Mutex<Vec<(Vec<Uuid>, OutboundMessage)>>,
}

impl RecordingTransport {
    pub async fn persisted(&self) -> Vec<NewNotification> {
        self.persisted.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<(Uuid, OutboundMessage)> {
        self.sent.lock().await.clone()
    }

    pub async fn broadcasts(&self) -> Vec<(Vec<Uuid>, OutboundMessage)> {
        self.broadcasts.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.persisted.lock().await.clear();
        self.sent.lock().await.clear();
        self.broadcasts.lock().await.clear();
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn persist(&self, new: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title.clone(),
            body: new.body.clone(),
            kind: new.kind,
            related_report_id: new.related_report_id,
            read: false,
            created_at: Utc::now(),
        };
        self.persisted.lock().await.push(new);
        Ok(notification)
    }

    async fn send_to_user(&self, user_id: Uuid, message: &OutboundMessage) -> Result<()> {
        self.sent.lock().await.push((user_id, message.clone()));
        Ok(())
    }

    async fn broadcast(&self, user_ids: &[Uuid], message: &OutboundMessage) -> Result<()> {
        self.broadcasts
            .lock()
            .await
            .push((user_ids.to_vec(), message.clone()));
        Ok(())
    }
}

/// Asset resolver standing in for an unreachable asset store
pub struct FailingAssetResolver;

#[async_trait]
impl AssetUrlResolver for FailingAssetResolver {
    async fn resolve_many(&self, _paths: &[String]) -> Result<HashMap<String, String>> {
        Err(AppError::Internal(
            "asset store unavailable".to_string(),
        ))
    }
}

/// Asset resolver that joins every path onto a fixed base
pub struct StaticAssetResolver {
    base: String,
}

impl StaticAssetResolver {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AssetUrlResolver for StaticAssetResolver {
    async fn resolve_many(&self, paths: &[String]) -> Result<HashMap<String, String>> {
        Ok(paths
            .iter()
            .map(|p| (p.clone(), format!("{}/{}", self.base, p.trim_start_matches('/'))))
            .collect())
    }
}
