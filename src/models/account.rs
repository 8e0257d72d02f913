use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Jobseeker,
    Employer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jobseeker => "jobseeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    /// Landing page an account of this role is sent to once it can use the portal.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Jobseeker => "jobseeker/dashboard",
            Role::Employer => "employer/dashboard",
            Role::Admin => "admin/dashboard",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobseeker" => Ok(Role::Jobseeker),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            other => Err(Error::Internal(format!("Unknown role: {}", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification state of an account. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Unverified,
    UnderReview,
    Active,
    Rejected,
    Suspended,
    Deleted,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 6] = [
        AccountStatus::Unverified,
        AccountStatus::UnderReview,
        AccountStatus::Active,
        AccountStatus::Rejected,
        AccountStatus::Suspended,
        AccountStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Unverified => "unverified",
            AccountStatus::UnderReview => "under_review",
            AccountStatus::Active => "active",
            AccountStatus::Rejected => "rejected",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Deleted => "deleted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AccountStatus::Deleted)
    }

    /// Suspended and deleted accounts may neither log in nor keep using a token.
    pub fn can_sign_in(&self) -> bool {
        match self {
            AccountStatus::Unverified
            | AccountStatus::UnderReview
            | AccountStatus::Active
            | AccountStatus::Rejected => true,
            AccountStatus::Suspended | AccountStatus::Deleted => false,
        }
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::Internal(format!("Unknown account status: {}", s)))
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub role: Role,
    pub status: AccountStatus,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw `users` row; role and status are parsed into their enums on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub role: String,
    pub status: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = Error;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            role: row.role.parse()?,
            status: row.status.parse()?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            status_reason: row.status_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Photo,
    ValidId,
}

impl DocumentKind {
    pub fn column(&self) -> &'static str {
        match self {
            DocumentKind::Photo => "photo_path",
            DocumentKind::ValidId => "valid_id_path",
        }
    }
}

/// Uploaded verification documents of a role profile. `None` means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileDocuments {
    pub photo_path: Option<String>,
    pub valid_id_path: Option<String>,
}

impl ProfileDocuments {
    /// Stored paths use the empty string for "no document".
    pub fn from_columns(photo_path: String, valid_id_path: String) -> Self {
        let keep = |p: String| if p.trim().is_empty() { None } else { Some(p) };
        Self {
            photo_path: keep(photo_path),
            valid_id_path: keep(valid_id_path),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.photo_path.is_some() && self.valid_id_path.is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.photo_path
            .as_deref()
            .into_iter()
            .chain(self.valid_id_path.as_deref())
    }
}

/// Admin-side lifecycle actions as sent by the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Approve,
    Reject,
    Suspend,
    Reactivate,
    Delete,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Approve => "approve",
            AdminAction::Reject => "reject",
            AdminAction::Suspend => "suspend",
            AdminAction::Reactivate => "reactivate",
            AdminAction::Delete => "delete",
        }
    }

    pub fn target(&self) -> AccountStatus {
        match self {
            AdminAction::Approve | AdminAction::Reactivate => AccountStatus::Active,
            AdminAction::Reject => AccountStatus::Rejected,
            AdminAction::Suspend => AccountStatus::Suspended,
            AdminAction::Delete => AccountStatus::Deleted,
        }
    }

    pub fn requires_reason(&self) -> bool {
        matches!(
            self,
            AdminAction::Reject | AdminAction::Suspend | AdminAction::Delete
        )
    }

    /// Whether the action may start from `from`.
    pub fn allowed_from(&self, from: AccountStatus) -> bool {
        use AccountStatus::*;
        match self {
            AdminAction::Approve => matches!(from, UnderReview | Rejected | Suspended),
            AdminAction::Reactivate => matches!(from, Rejected | Suspended),
            AdminAction::Reject => matches!(from, UnderReview),
            AdminAction::Suspend => matches!(from, Active),
            AdminAction::Delete => !from.is_terminal(),
        }
    }
}
