use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::account::{Account, AccountStatus, AdminAction, ProfileDocuments, Role};
use crate::models::profile::RoleProfile;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminActionPayload {
    pub action: AdminAction,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminActionResponse {
    pub success: bool,
    pub message: String,
    pub status: AccountStatus,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AccountListQuery {
    pub status: Option<AccountStatus>,
    pub role: Option<Role>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountListResponse {
    pub items: Vec<Account>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountDetailResponse {
    pub account: Account,
    pub profile: Option<RoleProfile>,
    pub documents: ProfileDocuments,
}

#[derive(Debug, Clone, Serialize, Default, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Default, ToSchema)]
pub struct DashboardStats {
    pub total_accounts: i64,
    pub pending_review: i64,
    pub active_jobs: i64,
    pub unread_contact_messages: i64,
    pub by_status: Vec<StatusCount>,
}
