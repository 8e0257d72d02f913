//! Persistence for user accounts and the document columns of their role profiles.
//!
//! [`AccountStore::transition_status`] is the only place an account status is
//! written after registration. It is a compare-and-swap on the current status,
//! so two concurrent transitions on one account can never both succeed.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{
    Account, AccountRow, AccountStatus, DocumentKind, ProfileDocuments, Role,
};

pub(crate) const ACCOUNT_COLUMNS: &str = "id, role, status, email, first_name, last_name, phone, \
     status_reason, created_at, updated_at, last_login_at";

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Account>>;

    /// Account and password hash for a login attempt.
    async fn find_credentials(&self, email: &str) -> Result<Option<(Account, String)>>;

    async fn record_login(&self, id: Uuid) -> Result<()>;

    async fn documents(&self, account: &Account) -> Result<ProfileDocuments>;

    /// Stores a document path and returns the path it replaced, if any.
    async fn set_document(
        &self,
        account: &Account,
        kind: DocumentKind,
        path: &str,
    ) -> Result<Option<String>>;

    async fn clear_documents(&self, account: &Account) -> Result<()>;

    /// Moves the account from `from` to `to`. Returns `None` when the stored
    /// status no longer equals `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: AccountStatus,
        to: AccountStatus,
        reason: Option<&str>,
    ) -> Result<Option<Account>>;
}

/// Profile table holding the documents of a role. Admins have none.
pub(crate) fn profile_table(role: Role) -> Option<&'static str> {
    match role {
        Role::Employer => Some("employers"),
        Role::Jobseeker => Some("jobseekers"),
        Role::Admin => None,
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(Account, String)>> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT password_hash FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        let Some((password_hash,)) = row else {
            return Ok(None);
        };

        let account = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(Some((Account::try_from(account)?, password_hash)))
    }

    async fn record_login(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn documents(&self, account: &Account) -> Result<ProfileDocuments> {
        let Some(table) = profile_table(account.role) else {
            return Ok(ProfileDocuments::default());
        };
        let row = sqlx::query_as::<_, (String, String)>(&format!(
            "SELECT photo_path, valid_id_path FROM {} WHERE user_id = $1",
            table
        ))
        .bind(account.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row
            .map(|(photo, valid_id)| ProfileDocuments::from_columns(photo, valid_id))
            .unwrap_or_default())
    }

    async fn set_document(
        &self,
        account: &Account,
        kind: DocumentKind,
        path: &str,
    ) -> Result<Option<String>> {
        let table = profile_table(account.role)
            .ok_or_else(|| Error::BadRequest("This account has no verification documents".into()))?;
        let column = kind.column();

        let mut tx = self.pool.begin().await?;
        let (previous,): (String,) = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE user_id = $1 FOR UPDATE",
            column, table
        ))
        .bind(account.id)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "UPDATE {} SET {} = $1, updated_at = NOW() WHERE user_id = $2",
            table, column
        ))
        .bind(path)
        .bind(account.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Some(previous).filter(|p| !p.trim().is_empty()))
    }

    async fn clear_documents(&self, account: &Account) -> Result<()> {
        let Some(table) = profile_table(account.role) else {
            return Ok(());
        };
        sqlx::query(&format!(
            "UPDATE {} SET photo_path = '', valid_id_path = '', updated_at = NOW() WHERE user_id = $1",
            table
        ))
        .bind(account.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AccountStatus,
        to: AccountStatus,
        reason: Option<&str>,
    ) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE users
            SET status = $1, status_reason = $2, updated_at = NOW()
            WHERE id = $3 AND status = $4
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(to.as_str())
        .bind(reason)
        .bind(id)
        .bind(from.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }
}
