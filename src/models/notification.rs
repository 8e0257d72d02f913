use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of in-app notification records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AccountApproved,
    AccountRejected,
    AccountSuspended,
    AccountDeleted,
    ApplicationReceived,
    ApplicationUpdated,
    NewMessage,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AccountApproved => "account_approved",
            NotificationKind::AccountRejected => "account_rejected",
            NotificationKind::AccountSuspended => "account_suspended",
            NotificationKind::AccountDeleted => "account_deleted",
            NotificationKind::ApplicationReceived => "application_received",
            NotificationKind::ApplicationUpdated => "application_updated",
            NotificationKind::NewMessage => "new_message",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
