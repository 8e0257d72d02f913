use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::message_dto::{SendMessagePayload, UnreadCountResponse},
    error::Result,
    models::{message::CreateMessage, notification::NotificationKind, session::Session},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 403, description = "Account is not active")
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    session.require_active()?;
    payload.validate()?;
    let message = state
        .messages
        .create(CreateMessage {
            sender_id: session.user_id,
            recipient_id: payload.recipient_id,
            body: payload.body,
        })
        .await?;

    if let Err(e) = state
        .notifications
        .create(
            message.recipient_id,
            NotificationKind::NewMessage,
            "You have a new message.",
        )
        .await
    {
        tracing::warn!(message_id = %message.id, error = %e, "failed to create message notification");
    }

    Ok((StatusCode::CREATED, Json(message)))
}

/// Conversation with another user. Reading it marks their messages read.
#[utoipa::path(
    get,
    path = "/api/messages/{user_id}",
    params(("user_id" = Uuid, Path, description = "The other participant")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [Message]),
        (status = 403, description = "Account is not active")
    )
)]
#[axum::debug_handler]
pub async fn conversation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(other_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    session.require_active()?;
    let messages = state.messages.conversation(session.user_id, other_id).await?;
    state.messages.mark_as_read(session.user_id, other_id).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    get,
    path = "/api/messages/unread",
    operation_id = "unread_message_count",
    responses((status = 200, description = "Unread messages", body = UnreadCountResponse))
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let unread = state.messages.unread_count(session.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}
