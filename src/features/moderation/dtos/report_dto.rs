use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::moderation::models::{
    ActionType, Priority, Report, ReportStatus, ReportTarget, ReportType, TargetKind,
};
use crate::features::moderation::services::enrichment_service::{
    ReporterSummary, TargetDisplay,
};
use crate::features::moderation::services::group_service::{
    AnnotatedReport, GroupDetail, ReportGroup,
};
use crate::features::moderation::store::ReportSearchCriteria;
use crate::shared::types::PaginationQuery;

/// Request body for filing a report
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    pub target_type: TargetKind,
    pub target_id: Uuid,
    pub report_type: ReportType,
    #[validate(length(min = 3, max = 200, message = "Reason must be 3-200 characters"))]
    pub reason: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

impl CreateReportDto {
    pub fn target(&self) -> ReportTarget {
        ReportTarget::new(self.target_type, self.target_id)
    }
}

/// Request body for reviewing a report
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewReportDto {
    pub action: ActionType,
    #[validate(length(max = 1000, message = "Admin note must be at most 1000 characters"))]
    pub admin_note: Option<String>,
    #[validate(length(max = 1000, message = "Action description must be at most 1000 characters"))]
    pub action_description: Option<String>,
}

/// Admin search filters for the flat report listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportFilterQuery {
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
    pub target_type: Option<TargetKind>,
    pub reporter_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ReportFilterQuery {
    pub fn criteria(&self) -> ReportSearchCriteria {
        ReportSearchCriteria {
            status: self.status,
            report_type: self.report_type,
            target_kind: self.target_type,
            reporter_id: self.reporter_id,
        }
    }

    pub fn pagination(&self) -> PaginationQuery {
        let defaults = PaginationQuery::default();
        PaginationQuery {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}

/// One report record as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_type: TargetKind,
    pub target_id: Uuid,
    pub report_type: ReportType,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub action_taken: Option<ActionType>,
    pub action_description: Option<String>,
    pub admin_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            target_type: report.target.kind(),
            target_id: report.target.id(),
            report_type: report.report_type,
            reason: report.reason,
            description: report.description,
            status: report.status,
            action_taken: report.action_taken,
            action_description: report.action_description,
            admin_note: report.admin_note,
            reviewed_by: report.reviewed_by,
            reviewed_at: report.reviewed_at,
            created_at: report.created_at,
        }
    }
}

/// One reporter shown in a group summary
#[derive(Debug, Serialize, ToSchema)]
pub struct ReporterSummaryDto {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<ReporterSummary> for ReporterSummaryDto {
    fn from(summary: ReporterSummary) -> Self {
        Self {
            user_id: summary.user_id,
            username: summary.username,
            avatar_url: summary.avatar_url,
        }
    }
}

/// Display data for a reported target; absent when the target has been
/// deleted since the reports were filed
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDisplayDto {
    User {
        username: String,
        avatar_url: Option<String>,
    },
    Recipe {
        title: String,
        author_id: Uuid,
        thumbnail_url: Option<String>,
    },
}

impl From<TargetDisplay> for TargetDisplayDto {
    fn from(display: TargetDisplay) -> Self {
        match display {
            TargetDisplay::User {
                username,
                avatar_url,
            } => TargetDisplayDto::User {
                username,
                avatar_url,
            },
            TargetDisplay::Recipe {
                title,
                author_id,
                thumbnail_url,
            } => TargetDisplayDto::Recipe {
                title,
                author_id,
                thumbnail_url,
            },
        }
    }
}

/// One entry in the grouped moderation queue
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportGroupDto {
    pub target_type: TargetKind,
    pub target_id: Uuid,
    pub report_count: i64,
    pub latest_report_at: DateTime<Utc>,
    pub weighted_score: f64,
    pub most_severe_type: Option<ReportType>,
    pub priority: Priority,
    pub breakdown: HashMap<ReportType, i64>,
    pub top_reporters: Vec<ReporterSummaryDto>,
    pub display: Option<TargetDisplayDto>,
}

impl From<ReportGroup> for ReportGroupDto {
    fn from(group: ReportGroup) -> Self {
        Self {
            target_type: group.target.kind(),
            target_id: group.target.id(),
            report_count: group.report_count,
            latest_report_at: group.latest_report_at,
            weighted_score: group.score.weighted_score,
            most_severe_type: group.score.most_severe_type,
            priority: group.priority,
            breakdown: group.enrichment.breakdown,
            top_reporters: group
                .enrichment
                .top_reporters
                .into_iter()
                .map(Into::into)
                .collect(),
            display: group.enrichment.display.map(Into::into),
        }
    }
}

/// One report row in a drill-down, with its reporter's display name
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnotatedReportDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub reporter_name: Option<String>,
}

impl From<AnnotatedReport> for AnnotatedReportDto {
    fn from(annotated: AnnotatedReport) -> Self {
        Self {
            report: annotated.report.into(),
            reporter_name: annotated.reporter_name,
        }
    }
}

/// Drill-down for one target: the group summary plus every report row
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDetailDto {
    pub group: ReportGroupDto,
    pub reports: Vec<AnnotatedReportDto>,
}

impl From<GroupDetail> for GroupDetailDto {
    fn from(detail: GroupDetail) -> Self {
        Self {
            group: detail.group.into(),
            reports: detail.reports.into_iter().map(Into::into).collect(),
        }
    }
}

/// Queue size per lifecycle status
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportStatsDto {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub resolved: i64,
}

impl ReportStatsDto {
    pub fn from_counts(counts: &HashMap<ReportStatus, i64>) -> Self {
        let get = |status| counts.get(&status).copied().unwrap_or(0);
        let pending = get(ReportStatus::Pending);
        let approved = get(ReportStatus::Approved);
        let rejected = get(ReportStatus::Rejected);
        let resolved = get(ReportStatus::Resolved);
        Self {
            total: pending + approved + rejected + resolved,
            pending,
            approved,
            rejected,
            resolved,
        }
    }
}

/// Result of a review: the decided report and its synchronized siblings
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewOutcomeDto {
    pub report: ReportResponseDto,
    pub synced: Vec<ReportResponseDto>,
}
