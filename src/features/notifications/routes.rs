use axum::{
    routing::{get, post},
    Router,
};

use crate::features::notifications::handlers::{
    self, NotificationState,
};

pub fn notification_routes(state: NotificationState) -> Router {
    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/{id}/read",
            post(handlers::mark_notification_read),
        )
        .route(
            "/api/notifications/stream",
            get(handlers::stream_notifications),
        )
        .with_state(state)
}
