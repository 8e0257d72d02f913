use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::admin_dto::{
    AccountListResponse, AdminActionPayload, AdminActionResponse, DashboardStats, StatusCount,
};
use crate::dto::application_dto::{ApplicationStatusPayload, ApplyPayload};
use crate::dto::auth_dto::{DocumentUploadResponse, LoginPayload, LoginResponse, RegisterPayload};
use crate::dto::job_dto::JobListResponse;
use crate::dto::message_dto::{ContactPayload, SendMessagePayload, UnreadCountResponse};
use crate::models::account::{Account, AccountStatus, AdminAction, Role};
use crate::models::application::{Application, ApplicationEvent, ApplicationStatus};
use crate::models::contact_message::ContactMessage;
use crate::models::job::{Job, JobStatus};
use crate::models::message::Message;
use crate::models::notification::Notification;

#[derive(OpenApi)]
#[openapi(
    info(title = "BagoScout API", description = "Accounts, verification, jobs and applications"),
    paths(
        super::health::health,
        super::auth::register,
        super::auth::login,
        super::account::upload_document,
        super::account::request_approval,
        super::admin::dashboard,
        super::admin::list_accounts,
        super::admin::account_detail,
        super::admin::apply_action,
        super::jobs::list_jobs,
        super::jobs::get_job,
        super::applications::apply,
        super::applications::my_applications,
        super::applications::job_applications,
        super::applications::set_application_status,
        super::applications::application_events,
        super::contact::submit_contact,
        super::admin::list_contact_messages,
        super::admin::mark_contact_message_read,
        super::messages::send_message,
        super::messages::conversation,
        super::messages::unread_count,
        super::notifications::list_notifications,
        super::notifications::unread_count,
        super::notifications::mark_read,
        super::notifications::mark_all_read,
    ),
    components(schemas(
        Account,
        AccountStatus,
        Role,
        AdminAction,
        AdminActionPayload,
        AdminActionResponse,
        RegisterPayload,
        LoginPayload,
        LoginResponse,
        DocumentUploadResponse,
        DashboardStats,
        StatusCount,
        AccountListResponse,
        Job,
        JobStatus,
        JobListResponse,
        Application,
        ApplicationStatus,
        ApplicationEvent,
        ApplyPayload,
        ApplicationStatusPayload,
        ContactPayload,
        ContactMessage,
        SendMessagePayload,
        Message,
        UnreadCountResponse,
        Notification,
    ))
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_the_admin_action_endpoint() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/api/admin/accounts/{id}/actions"]["post"].is_object());
        assert!(doc["components"]["schemas"]["AccountStatus"].is_object());
    }

    #[test]
    fn documents_application_decisions_and_the_inbox() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = &doc["paths"];
        assert!(paths["/api/applications/{id}/status"]["post"].is_object());
        assert!(paths["/api/applications/{id}/events"]["get"].is_object());
        assert!(paths["/api/contact"]["post"].is_object());
        assert!(paths["/api/admin/contact-messages"]["get"].is_object());
        assert!(paths["/api/messages/{user_id}"]["get"].is_object());
        assert!(paths["/api/notifications/read-all"]["post"].is_object());
        assert!(doc["components"]["schemas"]["ApplicationStatus"].is_object());
    }
}
