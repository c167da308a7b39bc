use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::config::ModerationConfig;
use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{
    ModerationScore, Priority, Report, ReportTarget,
};
use crate::features::moderation::services::enrichment_service::{
    EnrichmentService, TargetEnrichment,
};
use crate::features::moderation::services::severity::ScoreCalculator;
use crate::features::moderation::store::ReportStore;
use crate::shared::types::PaginationQuery;

/// One target in the moderation queue with its derived score and display data
#[derive(Debug, Clone)]
pub struct ReportGroup {
    pub target: ReportTarget,
    pub report_count: i64,
    pub latest_report_at: DateTime<Utc>,
    pub score: ModerationScore,
    pub priority: Priority,
    pub enrichment: TargetEnrichment,
}

/// One report row in a group drill-down, with its reporter's display name
/// when the account still resolves
#[derive(Debug, Clone)]
pub struct AnnotatedReport {
    pub report: Report,
    pub reporter_name: Option<String>,
}

/// Full drill-down for one target: the group summary plus every report row
#[derive(Debug, Clone)]
pub struct GroupDetail {
    pub group: ReportGroup,
    pub reports: Vec<AnnotatedReport>,
}

/// Builds the grouped moderation queue.
///
/// Grouping and scoring happen over whole pending sets, so pagination
/// slices the sorted result in memory rather than at the store. The
/// pending queue is small by construction (reviews drain it) and a
/// correct global sort needs every group's score anyway.
pub struct GroupService {
    store: Arc<dyn ReportStore>,
    enrichment: Arc<EnrichmentService>,
    calculator: ScoreCalculator,
}

impl GroupService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        enrichment: Arc<EnrichmentService>,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            store,
            enrichment,
            calculator: ScoreCalculator::new(config),
        }
    }

    /// List pending groups ordered by priority, then weighted score,
    /// then latest activity. Returns the requested page and the total
    /// number of groups.
    pub async fn list_groups(&self, page: &PaginationQuery) -> Result<(Vec<ReportGroup>, i64)> {
        let pending = self.store.list_pending_groups().await?;
        if pending.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let targets: Vec<ReportTarget> = pending.iter().map(|g| g.target).collect();
        let mut enriched = self.enrichment.enrich(&targets).await?;

        let mut groups: Vec<ReportGroup> = pending
            .into_iter()
            .map(|pending_group| {
                let enrichment = enriched
                    .remove(&pending_group.target)
                    .unwrap_or_else(|| TargetEnrichment {
                        breakdown: Default::default(),
                        top_reporters: Vec::new(),
                        display: None,
                    });
                let score = self.calculator.score(&enrichment.breakdown);
                let priority = self.calculator.priority(
                    score.weighted_score,
                    pending_group.target.kind(),
                    pending_group.report_count,
                );
                ReportGroup {
                    target: pending_group.target,
                    report_count: pending_group.report_count,
                    latest_report_at: pending_group.latest_report_at,
                    score,
                    priority,
                    enrichment,
                }
            })
            .collect();

        groups.sort_by(compare_groups);

        let total = groups.len() as i64;
        let start = (page.offset() as usize).min(groups.len());
        let end = (start + page.limit() as usize).min(groups.len());
        Ok((groups.drain(start..end).collect(), total))
    }

    /// Load one target's group with every report against it, pending or not
    pub async fn group_detail(&self, target: ReportTarget) -> Result<GroupDetail> {
        let reports = self.store.find_all_by_target(target).await?;
        if reports.is_empty() {
            return Err(AppError::NotFound(format!(
                "No reports found for target {}",
                target
            )));
        }

        let reporter_ids: Vec<Uuid> = reports
            .iter()
            .map(|r| r.reporter_id)
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        let targets = [target];
        let (mut enriched, reporter_names) = tokio::try_join!(
            self.enrichment.enrich(&targets),
            self.enrichment.reporter_names(&reporter_ids),
        )?;
        let enrichment = enriched
            .remove(&target)
            .unwrap_or_else(|| TargetEnrichment {
                breakdown: Default::default(),
                top_reporters: Vec::new(),
                display: None,
            });

        let pending_count = enrichment.breakdown.values().sum::<i64>();
        let score = self.calculator.score(&enrichment.breakdown);
        let priority = self
            .calculator
            .priority(score.weighted_score, target.kind(), pending_count);

        let latest_report_at = reports
            .iter()
            .map(|r| r.created_at)
            .max()
            .unwrap_or_else(Utc::now);

        let reports = reports
            .into_iter()
            .map(|report| AnnotatedReport {
                reporter_name: reporter_names.get(&report.reporter_id).cloned(),
                report,
            })
            .collect();

        Ok(GroupDetail {
            group: ReportGroup {
                target,
                report_count: pending_count,
                latest_report_at,
                score,
                priority,
                enrichment,
            },
            reports,
        })
    }
}

fn compare_groups(a: &ReportGroup, b: &ReportGroup) -> Ordering {
    b.priority
        .order()
        .cmp(&a.priority.order())
        .then_with(|| {
            b.score
                .weighted_score
                .partial_cmp(&a.score.weighted_score)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.latest_report_at.cmp(&a.latest_report_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::ReportType;
    use crate::shared::test_helpers::{
        FailingAssetResolver, InMemoryReportStore, StaticIdentityResolver,
    };
    use uuid::Uuid;

    fn service(store: Arc<InMemoryReportStore>) -> GroupService {
        let config = ModerationConfig::default();
        let resolver = Arc::new(StaticIdentityResolver::default());
        let enrichment = Arc::new(EnrichmentService::new(
            store.clone(),
            resolver,
            Arc::new(FailingAssetResolver),
            &config,
        ));
        GroupService::new(store, enrichment, &config)
    }

    #[tokio::test]
    async fn empty_queue_skips_enrichment_entirely() {
        // Enrichment would fail loudly here; an empty queue must not reach it.
        let store = Arc::new(InMemoryReportStore::new());
        let service = service(store);

        let (groups, total) = service
            .list_groups(&PaginationQuery::default())
            .await
            .unwrap();
        assert!(groups.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn groups_sort_by_priority_then_score() {
        let store = Arc::new(InMemoryReportStore::new());

        // Low-severity user target: one spam report, score 1.0
        let mild = ReportTarget::User(Uuid::new_v4());
        store
            .seed_pending(Uuid::new_v4(), mild, ReportType::Spam)
            .await;

        // Harassment pile on another user: 3 * 5.0 = 15.0, past the 10.0
        // user threshold so it outranks the mild group.
        let severe = ReportTarget::User(Uuid::new_v4());
        for _ in 0..3 {
            store
                .seed_pending(Uuid::new_v4(), severe, ReportType::Harassment)
                .await;
        }

        let service = service(store);
        let (groups, total) = service
            .list_groups(&PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(groups[0].target, severe);
        assert_eq!(groups[1].target, mild);
        assert!(groups[0].priority.order() > groups[1].priority.order());
        assert_eq!(groups[0].score.weighted_score, 15.0);
    }

    #[tokio::test]
    async fn repeated_listing_yields_identical_order() {
        let store = Arc::new(InMemoryReportStore::new());

        // Several groups, including two with identical scores, so the sort
        // has ties to keep stable across calls.
        for _ in 0..2 {
            let tied = ReportTarget::Recipe(Uuid::new_v4());
            store
                .seed_pending(Uuid::new_v4(), tied, ReportType::Spam)
                .await;
        }
        let severe = ReportTarget::User(Uuid::new_v4());
        for _ in 0..3 {
            store
                .seed_pending(Uuid::new_v4(), severe, ReportType::Harassment)
                .await;
        }

        let service = service(store);
        let page = PaginationQuery::default();
        let (first, total_first) = service.list_groups(&page).await.unwrap();
        let (second, total_second) = service.list_groups(&page).await.unwrap();

        assert_eq!(total_first, total_second);
        assert_eq!(
            first.iter().map(|g| g.target).collect::<Vec<_>>(),
            second.iter().map(|g| g.target).collect::<Vec<_>>()
        );
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.score.weighted_score, b.score.weighted_score);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.report_count, b.report_count);
        }
    }

    #[tokio::test]
    async fn pagination_slices_the_sorted_list() {
        let store = Arc::new(InMemoryReportStore::new());
        for _ in 0..5 {
            let target = ReportTarget::Recipe(Uuid::new_v4());
            store
                .seed_pending(Uuid::new_v4(), target, ReportType::Spam)
                .await;
        }

        let service = service(store);
        let page = PaginationQuery {
            page: 2,
            page_size: 2,
        };
        let (groups, total) = service.list_groups(&page).await.unwrap();

        assert_eq!(total, 5);
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn detail_for_unknown_target_is_not_found() {
        let store = Arc::new(InMemoryReportStore::new());
        let service = service(store);

        let result = service
            .group_detail(ReportTarget::Recipe(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn detail_annotates_reports_with_reporter_names() {
        let store = Arc::new(InMemoryReportStore::new());
        let target = ReportTarget::Recipe(Uuid::new_v4());
        let known_reporter = Uuid::new_v4();
        store
            .seed_pending(known_reporter, target, ReportType::Copyright)
            .await;
        store
            .seed_pending(Uuid::new_v4(), target, ReportType::Spam)
            .await;

        let mut resolver = StaticIdentityResolver::default();
        resolver.add_user(
            known_reporter,
            crate::features::platform::UserRef {
                username: "watcher".to_string(),
                avatar_path: None,
            },
        );
        let config = ModerationConfig::default();
        let resolver = Arc::new(resolver);
        let enrichment = Arc::new(EnrichmentService::new(
            store.clone(),
            resolver,
            Arc::new(FailingAssetResolver),
            &config,
        ));
        let service = GroupService::new(store, enrichment, &config);
        let detail = service.group_detail(target).await.unwrap();

        assert_eq!(detail.reports.len(), 2);
        assert_eq!(detail.group.report_count, 2);
        assert_eq!(detail.group.score.weighted_score, 5.0);
        assert_eq!(
            detail.group.score.most_severe_type,
            Some(ReportType::Copyright)
        );
        let known = detail
            .reports
            .iter()
            .find(|r| r.report.reporter_id == known_reporter)
            .unwrap();
        assert_eq!(known.reporter_name.as_deref(), Some("watcher"));
        // A reporter whose account vanished stays unnamed
        assert!(detail
            .reports
            .iter()
            .any(|r| r.reporter_name.is_none()));
    }
}
