use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{AccountStatus, Role};

/// Identity of the caller for one request, built by the session middleware
/// from a verified token and the account's current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub status: AccountStatus,
}

impl Session {
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Posting, applying and messaging are reserved to approved accounts.
    pub fn require_active(&self) -> Result<()> {
        if self.status == AccountStatus::Active {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    pub fn require_active_role(&self, role: Role) -> Result<()> {
        self.require_role(role)?;
        self.require_active()
    }
}
