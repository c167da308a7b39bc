//! Report aggregation, severity scoring, and enforcement for the platform.
//!
//! Individual reports are immutable once filed; the moderation queue is a
//! grouped view derived from them, scored per target and reviewed as a
//! unit.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::{
    AutoModerator, EnrichmentService, GroupService, ModerationNotifier, ReportService,
};
pub use store::{PgReportStore, ReportStore};
