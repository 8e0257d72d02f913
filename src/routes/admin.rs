use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        admin_dto::{AccountListQuery, AdminActionPayload, AdminActionResponse},
        message_dto::ContactListQuery,
    },
    error::Result,
    middleware::rate_limit::ClientAddr,
    models::{account::AccountStatus, session::Session},
    services::audit_service::RequestMeta,
    AppState,
};

/// Client address resolved by the rate limiter, plus the user agent.
fn request_meta(client: Option<ClientAddr>, headers: &HeaderMap) -> RequestMeta {
    let ip = client.and_then(|ClientAddr(ip)| ip).map(Into::into);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    RequestMeta { ip, user_agent }
}

fn success_message(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "Account approved successfully",
        AccountStatus::Rejected => "Account rejected successfully",
        AccountStatus::Suspended => "Account suspended successfully",
        AccountStatus::Deleted => "Account deleted successfully",
        AccountStatus::Unverified | AccountStatus::UnderReview => "Account updated successfully",
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Account counts by status and role", body = DashboardStats),
        (status = 403, description = "Not an admin")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.accounts.dashboard_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/accounts",
    params(
        ("status" = Option<String>, Query, description = "Filter by account status"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("search" = Option<String>, Query, description = "Name or email contains"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses((status = 200, description = "Accounts", body = AccountListResponse))
)]
#[axum::debug_handler]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.accounts.list(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account with its profile and documents"),
        (status = 404, description = "Account not found")
    )
)]
#[axum::debug_handler]
pub async fn account_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.accounts.detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/accounts/{id}/actions",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = AdminActionPayload,
    responses(
        (status = 200, description = "Status changed; warnings list failed notifications", body = AdminActionResponse),
        (status = 400, description = "Missing reason or transition not allowed"),
        (status = 403, description = "Not an admin, or the target is an admin"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Status changed concurrently")
    )
)]
#[axum::debug_handler]
pub async fn apply_action(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    client: Option<Extension<ClientAddr>>,
    headers: HeaderMap,
    Json(payload): Json<AdminActionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state
        .lifecycle
        .apply_admin_action(&session, id, payload.action, payload.reason.as_deref())
        .await?;

    state
        .audit
        .record_status_change(
            session.user_id,
            id,
            payload.action.as_str(),
            outcome.previous,
            outcome.account.status,
            outcome.account.status_reason.as_deref(),
            &request_meta(client.map(|Extension(c)| c), &headers),
        )
        .await;

    Ok(Json(AdminActionResponse {
        success: true,
        message: success_message(outcome.account.status).to_string(),
        status: outcome.account.status,
        warnings: outcome.warnings,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/contact-messages",
    params(
        ("status" = Option<String>, Query, description = "`unread` or `read`"),
        ("limit" = Option<i64>, Query, description = "At most this many")
    ),
    responses(
        (status = 200, description = "Contact messages, newest first", body = [ContactMessage]),
        (status = 403, description = "Not an admin")
    )
)]
#[axum::debug_handler]
pub async fn list_contact_messages(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.contacts.list(query).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/contact-messages/{id}/read",
    params(("id" = Uuid, Path, description = "Contact message ID")),
    responses(
        (status = 200, description = "Marked read", body = ContactMessage),
        (status = 404, description = "Contact message not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_contact_message_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let message = state.contacts.mark_read(id).await?;
    Ok((StatusCode::OK, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn records_the_resolved_client_not_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.1.1.1"));
        headers.insert("user-agent", HeaderValue::from_static("admin-console"));
        let client = ClientAddr("203.0.113.7".parse().ok());
        let meta = request_meta(Some(client), &headers);
        assert_eq!(meta.ip.map(|n| n.ip().to_string()).as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("admin-console"));
    }

    #[test]
    fn unknown_client_has_no_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.7"));
        assert!(request_meta(None, &headers).ip.is_none());
        assert!(request_meta(Some(ClientAddr(None)), &headers).ip.is_none());
    }
}
