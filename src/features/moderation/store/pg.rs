use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{
    ActionType, NewReport, PendingGroup, Report, ReportStatus, ReportTarget, ReportType,
    ReportTypeBreakdown, ReviewCommand, ReviewOutcome,
};
use crate::features::moderation::store::{ReportSearchCriteria, ReportStore};
use crate::shared::types::PaginationQuery;

const REPORT_COLUMNS: &str = "id, reporter_id, reported_user_id, recipe_id, report_type, reason, \
     description, status, action_taken, action_description, admin_note, reviewed_by, reviewed_at, \
     reporters_notified, created_at";

/// Relational row shape for a report; the target is two nullable columns
/// guarded by a CHECK constraint and converted to the tagged union here.
#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    reporter_id: Uuid,
    reported_user_id: Option<Uuid>,
    recipe_id: Option<Uuid>,
    report_type: ReportType,
    reason: String,
    description: Option<String>,
    status: ReportStatus,
    action_taken: Option<ActionType>,
    action_description: Option<String>,
    admin_note: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    reporters_notified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self> {
        let target = target_from_columns(row.reported_user_id, row.recipe_id)
            .ok_or_else(|| AppError::Internal(format!("Report {} has an invalid target", row.id)))?;

        Ok(Report {
            id: row.id,
            reporter_id: row.reporter_id,
            target,
            report_type: row.report_type,
            reason: row.reason,
            description: row.description,
            status: row.status,
            action_taken: row.action_taken,
            action_description: row.action_description,
            admin_note: row.admin_note,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            reporters_notified: row.reporters_notified,
            created_at: row.created_at,
        })
    }
}

fn target_from_columns(user_id: Option<Uuid>, recipe_id: Option<Uuid>) -> Option<ReportTarget> {
    match (user_id, recipe_id) {
        (Some(id), None) => Some(ReportTarget::User(id)),
        (None, Some(id)) => Some(ReportTarget::Recipe(id)),
        _ => None,
    }
}

/// Splits a target into its (reported_user_id, recipe_id) column pair
fn target_columns(target: ReportTarget) -> (Option<Uuid>, Option<Uuid>) {
    match target {
        ReportTarget::User(id) => (Some(id), None),
        ReportTarget::Recipe(id) => (None, Some(id)),
    }
}

/// Splits a target set into the id lists used by `= ANY($n)` batch queries
fn partition_targets(targets: &[ReportTarget]) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut user_ids = Vec::new();
    let mut recipe_ids = Vec::new();
    for target in targets {
        match target {
            ReportTarget::User(id) => user_ids.push(*id),
            ReportTarget::Recipe(id) => recipe_ids.push(*id),
        }
    }
    (user_ids, recipe_ids)
}

fn rows_to_reports(rows: Vec<ReportRow>) -> Result<Vec<Report>> {
    rows.into_iter().map(Report::try_from).collect()
}

/// Postgres-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, new: NewReport) -> Result<Report> {
        let (user_id, recipe_id) = target_columns(new.target);

        let sql = format!(
            "INSERT INTO reports (reporter_id, reported_user_id, recipe_id, report_type, reason, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REPORT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(new.reporter_id)
            .bind(user_id)
            .bind(recipe_id)
            .bind(new.report_type)
            .bind(&new.reason)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report: {:?}", e);
                AppError::Database(e)
            })?;

        let report = Report::try_from(row)?;
        tracing::info!(
            "Created report {} against {} by reporter {}",
            report.id,
            report.target,
            report.reporter_id
        );

        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        row.map(Report::try_from).transpose()
    }

    async fn find_pending_by_target(&self, target: ReportTarget) -> Result<Vec<Report>> {
        let (user_id, recipe_id) = target_columns(target);
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports \
             WHERE status = 'pending' \
               AND ($1::uuid IS NULL OR reported_user_id = $1) \
               AND ($2::uuid IS NULL OR recipe_id = $2) \
             ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch pending reports for {}: {:?}", target, e);
                AppError::Database(e)
            })?;

        rows_to_reports(rows)
    }

    async fn find_all_by_target(&self, target: ReportTarget) -> Result<Vec<Report>> {
        let (user_id, recipe_id) = target_columns(target);
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports \
             WHERE ($1::uuid IS NULL OR reported_user_id = $1) \
               AND ($2::uuid IS NULL OR recipe_id = $2) \
             ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports for {}: {:?}", target, e);
                AppError::Database(e)
            })?;

        rows_to_reports(rows)
    }

    async fn has_pending_from(&self, reporter_id: Uuid, target: ReportTarget) -> Result<bool> {
        let (user_id, recipe_id) = target_columns(target);

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                 SELECT 1 FROM reports \
                 WHERE status = 'pending' \
                   AND reporter_id = $1 \
                   AND ($2::uuid IS NULL OR reported_user_id = $2) \
                   AND ($3::uuid IS NULL OR recipe_id = $3))",
        )
        .bind(reporter_id)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check duplicate report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_by_status(&self, status: ReportStatus) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports by status: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn status_counts(&self) -> Result<HashMap<ReportStatus, i64>> {
        let rows = sqlx::query_as::<_, (ReportStatus, i64)>(
            "SELECT status, COUNT(*) FROM reports GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports per status: {:?}", e);
            AppError::Database(e)
        })?;

        let mut counts: HashMap<ReportStatus, i64> = [
            ReportStatus::Pending,
            ReportStatus::Approved,
            ReportStatus::Rejected,
            ReportStatus::Resolved,
        ]
        .into_iter()
        .map(|s| (s, 0))
        .collect();
        counts.extend(rows);

        Ok(counts)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        criteria: &ReportSearchCriteria,
        page: &PaginationQuery,
    ) -> Result<(Vec<Report>, i64)> {
        const FILTERS: &str = "($1::report_status IS NULL OR status = $1) \
             AND ($2::report_type IS NULL OR report_type = $2) \
             AND ($3::text IS NULL \
                  OR ($3 = 'user' AND reported_user_id IS NOT NULL) \
                  OR ($3 = 'recipe' AND recipe_id IS NOT NULL)) \
             AND ($4::uuid IS NULL OR reporter_id = $4)";

        let kind = criteria.target_kind.map(|k| k.to_string());

        let count_sql = format!("SELECT COUNT(*) FROM reports WHERE {FILTERS}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(criteria.status)
            .bind(criteria.report_type)
            .bind(&kind)
            .bind(criteria.reporter_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count report search: {:?}", e);
                AppError::Database(e)
            })?;

        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE {FILTERS} \
             ORDER BY created_at DESC OFFSET $5 LIMIT $6"
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(criteria.status)
            .bind(criteria.report_type)
            .bind(&kind)
            .bind(criteria.reporter_id)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows_to_reports(rows)?, total))
    }

    async fn list_pending_groups(&self) -> Result<Vec<PendingGroup>> {
        let rows = sqlx::query_as::<_, (Option<Uuid>, Option<Uuid>, i64, DateTime<Utc>)>(
            "SELECT reported_user_id, recipe_id, COUNT(*), MAX(created_at) \
             FROM reports \
             WHERE status = 'pending' \
             GROUP BY reported_user_id, recipe_id \
             ORDER BY MAX(created_at) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pending report groups: {:?}", e);
            AppError::Database(e)
        })?;

        rows.into_iter()
            .map(|(user_id, recipe_id, report_count, latest_report_at)| {
                let target = target_from_columns(user_id, recipe_id).ok_or_else(|| {
                    AppError::Internal("Pending group with invalid target".to_string())
                })?;
                Ok(PendingGroup {
                    target,
                    report_count,
                    latest_report_at,
                })
            })
            .collect()
    }

    async fn breakdown_for_target(&self, target: ReportTarget) -> Result<ReportTypeBreakdown> {
        let (user_id, recipe_id) = target_columns(target);

        let rows = sqlx::query_as::<_, (ReportType, i64)>(
            "SELECT report_type, COUNT(*) FROM reports \
             WHERE status = 'pending' \
               AND ($1::uuid IS NULL OR reported_user_id = $1) \
               AND ($2::uuid IS NULL OR recipe_id = $2) \
             GROUP BY report_type",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load breakdown for {}: {:?}", target, e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().collect())
    }

    async fn breakdowns_for_targets(
        &self,
        targets: &[ReportTarget],
    ) -> Result<HashMap<ReportTarget, ReportTypeBreakdown>> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }
        let (user_ids, recipe_ids) = partition_targets(targets);

        let rows = sqlx::query_as::<_, (Option<Uuid>, Option<Uuid>, ReportType, i64)>(
            "SELECT reported_user_id, recipe_id, report_type, COUNT(*) \
             FROM reports \
             WHERE status = 'pending' \
               AND (reported_user_id = ANY($1) OR recipe_id = ANY($2)) \
             GROUP BY reported_user_id, recipe_id, report_type",
        )
        .bind(&user_ids)
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to batch-load breakdowns: {:?}", e);
            AppError::Database(e)
        })?;

        let mut breakdowns: HashMap<ReportTarget, ReportTypeBreakdown> = HashMap::new();
        for (user_id, recipe_id, report_type, count) in rows {
            let target = target_from_columns(user_id, recipe_id).ok_or_else(|| {
                AppError::Internal("Breakdown row with invalid target".to_string())
            })?;
            breakdowns.entry(target).or_default().insert(report_type, count);
        }

        Ok(breakdowns)
    }

    async fn top_reporter_ids(
        &self,
        targets: &[ReportTarget],
        limit: i64,
    ) -> Result<HashMap<ReportTarget, Vec<Uuid>>> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }
        let (user_ids, recipe_ids) = partition_targets(targets);

        // Distinct reporters per target, newest report first; reporter id
        // breaks timestamp ties so the cap is deterministic.
        let rows = sqlx::query_as::<_, (Option<Uuid>, Option<Uuid>, Uuid)>(
            "SELECT reported_user_id, recipe_id, reporter_id FROM ( \
                 SELECT reported_user_id, recipe_id, reporter_id, \
                        ROW_NUMBER() OVER ( \
                            PARTITION BY reported_user_id, recipe_id \
                            ORDER BY MAX(created_at) DESC, reporter_id \
                        ) AS rank \
                 FROM reports \
                 WHERE status = 'pending' \
                   AND (reported_user_id = ANY($1) OR recipe_id = ANY($2)) \
                 GROUP BY reported_user_id, recipe_id, reporter_id \
             ) ranked \
             WHERE rank <= $3 \
             ORDER BY rank",
        )
        .bind(&user_ids)
        .bind(&recipe_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to batch-load top reporters: {:?}", e);
            AppError::Database(e)
        })?;

        let mut reporters: HashMap<ReportTarget, Vec<Uuid>> = HashMap::new();
        for (user_id, recipe_id, reporter_id) in rows {
            let target = target_from_columns(user_id, recipe_id).ok_or_else(|| {
                AppError::Internal("Reporter row with invalid target".to_string())
            })?;
            reporters.entry(target).or_default().push(reporter_id);
        }

        Ok(reporters)
    }

    async fn review(&self, id: Uuid, command: ReviewCommand) -> Result<ReviewOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to open review transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // Row lock so two concurrent reviews serialize on the same report
        let lock_sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, ReportRow>(&lock_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock report {} for review: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        let current = Report::try_from(row)?;
        if current.status.is_terminal() {
            return Err(AppError::AlreadyReviewed);
        }

        let status = command.action.resulting_status();
        let now = Utc::now();

        let update_sql = format!(
            "UPDATE reports \
             SET status = $2, action_taken = $3, action_description = $4, admin_note = $5, \
                 reviewed_by = $6, reviewed_at = $7 \
             WHERE id = $1 \
             RETURNING {REPORT_COLUMNS}"
        );
        let reviewed = sqlx::query_as::<_, ReportRow>(&update_sql)
            .bind(id)
            .bind(status)
            .bind(command.action)
            .bind(&command.action_description)
            .bind(&command.admin_note)
            .bind(command.reviewed_by)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to apply review to report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        // One decision resolves the whole group: every other pending report
        // on the same target moves to the same terminal state.
        let (user_id, recipe_id) = target_columns(current.target);
        let sync_sql = format!(
            "UPDATE reports \
             SET status = $2, action_taken = $3, reviewed_by = $4, reviewed_at = $5 \
             WHERE status = 'pending' AND id <> $1 \
               AND ($6::uuid IS NULL OR reported_user_id = $6) \
               AND ($7::uuid IS NULL OR recipe_id = $7) \
             RETURNING {REPORT_COLUMNS}"
        );
        let synced = sqlx::query_as::<_, ReportRow>(&sync_sql)
            .bind(id)
            .bind(status)
            .bind(command.action)
            .bind(command.reviewed_by)
            .bind(now)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to sync group for report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit review of report {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        let outcome = ReviewOutcome {
            report: Report::try_from(reviewed)?,
            synced: rows_to_reports(synced)?,
        };
        tracing::info!(
            "Report {} reviewed as {} ({}); {} sibling report(s) synced",
            id,
            status,
            command.action,
            outcome.synced.len()
        );

        Ok(outcome)
    }

    async fn mark_reporters_notified(&self, report_ids: &[Uuid]) -> Result<()> {
        if report_ids.is_empty() {
            return Ok(());
        }

        sqlx::query("UPDATE reports SET reporters_notified = TRUE WHERE id = ANY($1)")
            .bind(report_ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark reporters notified: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_columns_are_mutually_exclusive() {
        let id = Uuid::new_v4();

        let (user, recipe) = target_columns(ReportTarget::User(id));
        assert_eq!(user, Some(id));
        assert_eq!(recipe, None);

        let (user, recipe) = target_columns(ReportTarget::Recipe(id));
        assert_eq!(user, None);
        assert_eq!(recipe, Some(id));
    }

    #[test]
    fn invalid_column_pairs_produce_no_target() {
        let id = Uuid::new_v4();
        assert!(target_from_columns(None, None).is_none());
        assert!(target_from_columns(Some(id), Some(id)).is_none());
        assert!(matches!(
            target_from_columns(Some(id), None),
            Some(ReportTarget::User(_))
        ));
    }

    #[test]
    fn partition_splits_by_kind() {
        let u = Uuid::new_v4();
        let r = Uuid::new_v4();
        let (users, recipes) =
            partition_targets(&[ReportTarget::User(u), ReportTarget::Recipe(r)]);
        assert_eq!(users, vec![u]);
        assert_eq!(recipes, vec![r]);
    }
}
