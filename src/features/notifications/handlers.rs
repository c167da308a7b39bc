use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::identity::AuthenticatedUser;
use crate::features::notifications::dtos::NotificationDto;
use crate::features::notifications::hub::RealtimeHub;
use crate::features::notifications::service::NotificationService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// State for notification handlers
#[derive(Clone)]
pub struct NotificationState {
    pub service: Arc<NotificationService>,
    pub hub: RealtimeHub,
}

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Caller's notifications", body = ApiResponse<Vec<NotificationDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationDto>>>> {
    let (notifications, total) = state.service.list_for_user(user.user_id, &page).await?;
    let dtos: Vec<NotificationDto> = notifications.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Mark one notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<NotificationDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDto>>> {
    let notification = state.service.mark_read(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(
        Some(notification.into()),
        None,
        None,
    )))
}

/// Realtime notification feed for the caller
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notification events", content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications"
)]
pub async fn stream_notifications(
    user: AuthenticatedUser,
    State(state): State<NotificationState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let user_id = user.user_id;
    let rx = state.hub.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |event| {
        // Lagged subscribers just skip dropped events
        let event = event.ok()?;
        if !event.is_for(user_id) {
            return None;
        }
        let sse = Event::default()
            .event("notification")
            .json_data(&event.message)
            .ok()?;
        Some(Ok(sse))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
