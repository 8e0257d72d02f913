use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::message_dto::{LimitQuery, UnreadCountResponse},
    error::{Error, Result},
    models::session::Session,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(("limit" = Option<i64>, Query, description = "At most this many, 1 to 200, default 50")),
    responses((status = 200, description = "Newest first", body = [Notification]))
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    Ok(Json(
        state.notifications.list_for_user(session.user_id, limit).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    operation_id = "unread_notification_count",
    responses((status = 200, description = "Unread notifications", body = UnreadCountResponse))
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let unread = state.notifications.unread_count(session.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found or owned by someone else")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.notifications.mark_read(session.user_id, id).await? {
        return Err(Error::NotFound("Notification not found".into()));
    }
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses((status = 200, description = "Number of notifications marked read"))
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let updated = state.notifications.mark_all_read(session.user_id).await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}
