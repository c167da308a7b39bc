use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::identity::{AuthenticatedUser, RequireModerator};
use crate::features::moderation::dtos::{
    CreateReportDto, GroupDetailDto, ReportFilterQuery, ReportGroupDto, ReportResponseDto,
    ReportStatsDto, ReviewOutcomeDto, ReviewReportDto,
};
use crate::features::moderation::models::{NewReport, ReportTarget, ReviewCommand, TargetKind};
use crate::features::moderation::services::{GroupService, ReportService};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// State for moderation handlers
#[derive(Clone)]
pub struct ModerationState {
    pub report_service: Arc<ReportService>,
    pub group_service: Arc<GroupService>,
}

/// File a report against a user or recipe
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 200, description = "Report filed", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid report"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Target not found"),
        (status = 409, description = "Duplicate pending report")
    ),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ModerationState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = state
        .report_service
        .create_report(NewReport {
            reporter_id: user.user_id,
            target: dto.target(),
            report_type: dto.report_type,
            reason: dto.reason,
            description: dto.description,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report submitted".to_string()),
        None,
    )))
}

/// Grouped moderation queue ordered by priority
#[utoipa::path(
    get,
    path = "/api/moderation/reports/groups",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Pending report groups", body = ApiResponse<Vec<ReportGroupDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required")
    ),
    tag = "moderation"
)]
pub async fn list_report_groups(
    RequireModerator(_user): RequireModerator,
    State(state): State<ModerationState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportGroupDto>>>> {
    let (groups, total) = state.group_service.list_groups(&page).await?;
    let dtos: Vec<ReportGroupDto> = groups.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Every report against one target, with the group summary
#[utoipa::path(
    get,
    path = "/api/moderation/reports/groups/{target_type}/{target_id}",
    params(
        ("target_type" = TargetKind, Path, description = "Kind of reported entity"),
        ("target_id" = Uuid, Path, description = "Reported entity ID")
    ),
    responses(
        (status = 200, description = "Group detail", body = ApiResponse<GroupDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required"),
        (status = 404, description = "No reports for this target")
    ),
    tag = "moderation"
)]
pub async fn get_report_group(
    RequireModerator(_user): RequireModerator,
    State(state): State<ModerationState>,
    Path((target_type, target_id)): Path<(TargetKind, Uuid)>,
) -> Result<Json<ApiResponse<GroupDetailDto>>> {
    let detail = state
        .group_service
        .group_detail(ReportTarget::new(target_type, target_id))
        .await?;
    Ok(Json(ApiResponse::success(Some(detail.into()), None, None)))
}

/// Flat filtered report listing for moderators
#[utoipa::path(
    get,
    path = "/api/moderation/reports",
    params(ReportFilterQuery),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required")
    ),
    tag = "moderation"
)]
pub async fn search_reports(
    RequireModerator(_user): RequireModerator,
    State(state): State<ModerationState>,
    Query(filter): Query<ReportFilterQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state
        .report_service
        .search_reports(&filter.criteria(), &filter.pagination())
        .await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Queue size per lifecycle status
#[utoipa::path(
    get,
    path = "/api/moderation/reports/stats",
    responses(
        (status = 200, description = "Report counts", body = ApiResponse<ReportStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required")
    ),
    tag = "moderation"
)]
pub async fn report_stats(
    RequireModerator(_user): RequireModerator,
    State(state): State<ModerationState>,
) -> Result<Json<ApiResponse<ReportStatsDto>>> {
    let counts = state.report_service.status_counts().await?;
    Ok(Json(ApiResponse::success(
        Some(ReportStatsDto::from_counts(&counts)),
        None,
        None,
    )))
}

/// Review a pending report
#[utoipa::path(
    post,
    path = "/api/moderation/reports/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = ReviewReportDto,
    responses(
        (status = 200, description = "Review applied", body = ApiResponse<ReviewOutcomeDto>),
        (status = 400, description = "Action incompatible with target"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already reviewed")
    ),
    tag = "moderation"
)]
pub async fn review_report(
    RequireModerator(user): RequireModerator,
    State(state): State<ModerationState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReviewReportDto>,
) -> Result<Json<ApiResponse<ReviewOutcomeDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .report_service
        .review_report(
            id,
            ReviewCommand {
                action: dto.action,
                admin_note: dto.admin_note,
                action_description: dto.action_description,
                reviewed_by: user.user_id,
            },
        )
        .await?;

    let dto = ReviewOutcomeDto {
        report: outcome.report.into(),
        synced: outcome.synced.into_iter().map(Into::into).collect(),
    };
    Ok(Json(ApiResponse::success(
        Some(dto),
        Some("Review applied".to_string()),
        None,
    )))
}

/// Delete a report record
#[utoipa::path(
    delete,
    path = "/api/moderation/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required"),
        (status = 404, description = "Report not found")
    ),
    tag = "moderation"
)]
pub async fn delete_report(
    RequireModerator(_user): RequireModerator,
    State(state): State<ModerationState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    state.report_service.delete_report(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted".to_string()),
        None,
    )))
}
