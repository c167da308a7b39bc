pub mod report_dto;

pub use report_dto::{
    AnnotatedReportDto, CreateReportDto, GroupDetailDto, ReportFilterQuery, ReportGroupDto,
    ReportResponseDto, ReportStatsDto, ReporterSummaryDto, ReviewOutcomeDto, ReviewReportDto,
    TargetDisplayDto,
};
