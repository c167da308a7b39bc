use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::moderation::handlers::{self, ModerationState};
use crate::features::moderation::services::{GroupService, ReportService};

/// Create routes for the moderation feature
///
/// Filing only needs an authenticated caller; everything under
/// /api/moderation additionally requires the moderator role (enforced
/// per-handler by the RequireModerator extractor).
pub fn routes(report_service: Arc<ReportService>, group_service: Arc<GroupService>) -> Router {
    let state = ModerationState {
        report_service,
        group_service,
    };

    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route(
            "/api/moderation/reports/groups",
            get(handlers::list_report_groups),
        )
        .route(
            "/api/moderation/reports/groups/{target_type}/{target_id}",
            get(handlers::get_report_group),
        )
        .route("/api/moderation/reports", get(handlers::search_reports))
        .route("/api/moderation/reports/stats", get(handlers::report_stats))
        .route(
            "/api/moderation/reports/{id}/review",
            post(handlers::review_report),
        )
        .route(
            "/api/moderation/reports/{id}",
            delete(handlers::delete_report),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ModerationConfig;
    use crate::features::identity::guards::{USER_ID_HEADER, USER_ROLES_HEADER};
    use crate::features::moderation::services::{
        AutoModerator, EnrichmentService, ModerationNotifier,
    };
    use crate::features::platform::UserRef;
    use crate::shared::test_helpers::{
        FailingAssetResolver, InMemoryReportStore, RecordingEnforcement, RecordingTransport,
        StaticIdentityResolver,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use fake::faker::internet::en::Username;
    use fake::Fake;
    use serde_json::json;
    use uuid::Uuid;

    fn server_with(resolver: StaticIdentityResolver) -> (TestServer, Arc<InMemoryReportStore>) {
        let store = Arc::new(InMemoryReportStore::new());
        let resolver = Arc::new(resolver);
        let config = ModerationConfig::default();
        let notifier = Arc::new(ModerationNotifier::new(
            store.clone(),
            resolver.clone(),
            Arc::new(RecordingTransport::default()),
        ));
        let auto_moderator = Arc::new(AutoModerator::new(
            store.clone(),
            resolver.clone(),
            Arc::new(RecordingEnforcement::default()),
            notifier.clone(),
            &config,
        ));
        let enrichment = Arc::new(EnrichmentService::new(
            store.clone(),
            resolver.clone(),
            Arc::new(FailingAssetResolver),
            &config,
        ));
        let report_service = Arc::new(ReportService::new(
            store.clone(),
            resolver,
            Arc::new(RecordingEnforcement::default()),
            notifier,
            auto_moderator,
        ));
        let group_service = Arc::new(GroupService::new(store.clone(), enrichment, &config));

        let server = TestServer::new(routes(report_service, group_service)).unwrap();
        (server, store)
    }

    fn resolver_with_user(id: Uuid) -> StaticIdentityResolver {
        let mut resolver = StaticIdentityResolver::default();
        resolver.add_user(
            id,
            UserRef {
                username: Username().fake(),
                avatar_path: None,
            },
        );
        resolver
    }

    #[tokio::test]
    async fn filing_requires_identity_headers() {
        let (server, _) = server_with(StaticIdentityResolver::default());

        let response = server
            .post("/api/reports")
            .json(&json!({
                "target_type": "user",
                "target_id": Uuid::new_v4(),
                "report_type": "spam",
                "reason": "spam in bio"
            }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn moderation_queue_rejects_plain_users() {
        let (server, _) = server_with(StaticIdentityResolver::default());

        let response = server
            .get("/api/moderation/reports/groups")
            .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .add_header(USER_ROLES_HEADER, "user")
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn filed_report_shows_up_in_the_queue() {
        let reported = Uuid::new_v4();
        let (server, _) = server_with(resolver_with_user(reported));

        let response = server
            .post("/api/reports")
            .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .json(&json!({
                "target_type": "user",
                "target_id": reported,
                "report_type": "harassment",
                "reason": "abusive comments"
            }))
            .await;
        response.assert_status_ok();

        let queue = server
            .get("/api/moderation/reports/groups")
            .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .add_header(USER_ROLES_HEADER, "moderator")
            .await;
        queue.assert_status_ok();

        let body: serde_json::Value = queue.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["target_id"], json!(reported));
        assert_eq!(body["data"][0]["weighted_score"], 5.0);
    }

    #[tokio::test]
    async fn invalid_payload_is_a_bad_request() {
        let (server, _) = server_with(StaticIdentityResolver::default());

        let response = server
            .post("/api/reports")
            .add_header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .json(&json!({
                "target_type": "user",
                "target_id": Uuid::new_v4(),
                "report_type": "spam",
                "reason": "x"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
