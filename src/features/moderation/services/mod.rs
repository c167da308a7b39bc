pub mod auto_moderation;
pub mod enrichment_service;
pub mod group_service;
pub mod notifier;
pub mod report_service;
pub mod severity;

pub use auto_moderation::{AutoModerationOutcome, AutoModerator};
pub use enrichment_service::{EnrichmentService, ReporterSummary, TargetDisplay, TargetEnrichment};
pub use group_service::{AnnotatedReport, GroupDetail, GroupService, ReportGroup};
pub use notifier::ModerationNotifier;
pub use report_service::ReportService;
pub use severity::{severity_weight, ScoreCalculator};
