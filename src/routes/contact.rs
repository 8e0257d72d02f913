use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{dto::message_dto::ContactPayload, error::Result, AppState};

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Message stored for the admins"),
        (status = 400, description = "Validation failed")
    )
)]
#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state.contacts.submit(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": message.id })),
    ))
}
