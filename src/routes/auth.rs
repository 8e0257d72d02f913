use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginPayload, LoginResponse, RegisterPayload},
    error::Result,
    models::{account::AccountStatus, session::Session},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created as unverified", body = crate::models::account::Account),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let account = state.accounts.register(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Bad credentials, or the account is suspended or deleted")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let result = state.auth.login(&payload.email, &payload.password).await?;
    let redirect = match result.account.status {
        AccountStatus::Active => result.account.role.dashboard_path().to_string(),
        _ => "account/verification".to_string(),
    };
    Ok(Json(LoginResponse {
        token: result.token,
        account: result.account,
        redirect,
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let account = state.accounts.get(session.user_id).await?;
    let profile = state.accounts.profile(&account).await?;
    Ok(Json(json!({ "account": account, "profile": profile })))
}
