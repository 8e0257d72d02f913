use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    dto::admin_dto::AccountListQuery, error::Result, services::export_service::ExportService,
    AppState,
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Accounts matching the list filters as an XLSX download.
#[axum::debug_handler]
pub async fn export_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<impl IntoResponse> {
    let accounts = state.accounts.list_all(&query).await?;
    let buffer = ExportService::generate_accounts_xlsx(&accounts)?;

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M");
    let filename = match query.status {
        Some(status) => format!("accounts_{}_{}.xlsx", status, stamp),
        None => format!("accounts_{}.xlsx", stamp),
    };
    tracing::info!(count = accounts.len(), %filename, "accounts exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        buffer,
    ))
}
