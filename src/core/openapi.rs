use utoipa::{Modify, OpenApi};

use crate::features::moderation::{dtos as moderation_dtos, handlers as moderation_handlers};
use crate::features::moderation::models as moderation_models;
use crate::features::notifications::{
    dtos as notification_dtos, handlers as notification_handlers,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        moderation_handlers::report_handler::create_report,
        // Moderation queue
        moderation_handlers::report_handler::list_report_groups,
        moderation_handlers::report_handler::get_report_group,
        moderation_handlers::report_handler::search_reports,
        moderation_handlers::report_handler::report_stats,
        moderation_handlers::report_handler::review_report,
        moderation_handlers::report_handler::delete_report,
        // Notifications
        notification_handlers::list_notifications,
        notification_handlers::mark_notification_read,
        notification_handlers::stream_notifications,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Moderation
            moderation_models::ReportType,
            moderation_models::ReportStatus,
            moderation_models::ActionType,
            moderation_models::TargetKind,
            moderation_models::Priority,
            moderation_dtos::CreateReportDto,
            moderation_dtos::ReviewReportDto,
            moderation_dtos::ReportResponseDto,
            moderation_dtos::ReporterSummaryDto,
            moderation_dtos::TargetDisplayDto,
            moderation_dtos::ReportGroupDto,
            moderation_dtos::AnnotatedReportDto,
            moderation_dtos::GroupDetailDto,
            moderation_dtos::ReportStatsDto,
            moderation_dtos::ReviewOutcomeDto,
            ApiResponse<moderation_dtos::ReportResponseDto>,
            ApiResponse<Vec<moderation_dtos::ReportResponseDto>>,
            ApiResponse<Vec<moderation_dtos::ReportGroupDto>>,
            ApiResponse<moderation_dtos::GroupDetailDto>,
            ApiResponse<moderation_dtos::ReportStatsDto>,
            ApiResponse<moderation_dtos::ReviewOutcomeDto>,
            // Notifications
            notification_dtos::NotificationDto,
            crate::features::notifications::models::NotificationKind,
            crate::features::notifications::models::OutboundMessage,
            ApiResponse<notification_dtos::NotificationDto>,
            ApiResponse<Vec<notification_dtos::NotificationDto>>,
        )
    ),
    tags(
        (name = "reports", description = "Filing reports against users and recipes"),
        (name = "moderation", description = "Grouped report queue, review, and enforcement (moderator only)"),
        (name = "notifications", description = "Per-user notifications and the realtime feed"),
    ),
    info(
        title = "RecipeShare Moderation API",
        version = "0.1.0",
        description = "Report aggregation and moderation for RecipeShare",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
