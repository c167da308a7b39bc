pub mod report_handler;

pub use report_handler::{
    __path_create_report, __path_delete_report, __path_get_report_group,
    __path_list_report_groups, __path_report_stats, __path_review_report, __path_search_reports,
    create_report, delete_report, get_report_group, list_report_groups, report_stats,
    review_report, search_reports, ModerationState,
};
