pub mod report;

pub use report::{
    ActionType, ModerationScore, NewReport, PendingGroup, Priority, Report, ReportStatus,
    ReportTarget, ReportType, ReportTypeBreakdown, ReviewCommand, ReviewOutcome, TargetKind,
};
