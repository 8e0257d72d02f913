use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;

use crate::{
    dto::auth_dto::DocumentUploadResponse,
    error::{Error, Result},
    models::{account::DocumentKind, session::Session},
    AppState,
};

fn document_kind(field_name: &str) -> Option<DocumentKind> {
    match field_name {
        "photo" => Some(DocumentKind::Photo),
        "valid_id" => Some(DocumentKind::ValidId),
        _ => None,
    }
}

/// Multipart upload with one `photo` or `valid_id` file field.
#[utoipa::path(
    post,
    path = "/api/account/documents",
    responses(
        (status = 200, description = "Document stored", body = DocumentUploadResponse),
        (status = 400, description = "Missing, oversized or disallowed file"),
        (status = 401, description = "Not signed in")
    )
)]
#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        let Some(kind) = field.name().and_then(document_kind) else {
            continue;
        };
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| Error::BadRequest("Document must be sent as a file".into()))?;
        let data = field.bytes().await?;

        let path = state
            .lifecycle
            .upload_document(&session, kind, &filename, &data)
            .await?;
        return Ok(Json(DocumentUploadResponse {
            success: true,
            path,
        }));
    }
    Err(Error::BadRequest(
        "Expected a `photo` or `valid_id` file field".into(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/account/request-approval",
    responses(
        (status = 200, description = "Account submitted for review"),
        (status = 400, description = "Documents missing or account not unverified"),
        (status = 409, description = "Status changed concurrently")
    )
)]
#[axum::debug_handler]
pub async fn request_approval(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let account = state.lifecycle.request_review(&session).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Your account has been submitted for review.",
        "status": account.status,
    })))
}
