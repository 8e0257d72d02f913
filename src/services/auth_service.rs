use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, AccountStatus};
use crate::models::session::Session;
use crate::services::account_store::AccountStore;
use crate::utils::{crypto, token};

pub struct LoginResult {
    pub token: String,
    pub account: Account,
}

/// Login and per-request session resolution.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn AccountStore>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_hours,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let invalid = || Error::Unauthorized("Invalid email or password".into());

        let (account, password_hash) = self
            .store
            .find_credentials(email.trim())
            .await?
            .ok_or_else(invalid)?;
        if !crypto::verify_password(password, &password_hash) {
            tracing::info!(user_id = %account.id, "login rejected: wrong password");
            return Err(invalid());
        }
        ensure_can_sign_in(account.status)?;

        self.store.record_login(account.id).await?;
        let token = token::issue_token(&self.jwt_secret, account.id, account.role, self.token_ttl_hours)
            .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))?;

        tracing::info!(user_id = %account.id, role = %account.role, "user logged in");
        Ok(LoginResult { token, account })
    }

    /// Resolves a bearer token against the account's current row, so a
    /// suspension takes effect on the very next request.
    pub async fn authenticate(&self, bearer: &str) -> Result<Session> {
        let claims = token::decode_token(&self.jwt_secret, bearer)
            .map_err(|_| Error::Unauthorized("invalid_token".into()))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_token".into()))?;

        let account = self
            .store
            .find(user_id)
            .await?
            .ok_or_else(|| Error::Unauthorized("invalid_token".into()))?;
        ensure_can_sign_in(account.status)?;

        Ok(Session {
            user_id: account.id,
            role: account.role,
            status: account.status,
        })
    }
}

fn ensure_can_sign_in(status: AccountStatus) -> Result<()> {
    match status {
        AccountStatus::Suspended => Err(Error::Unauthorized("This account has been suspended".into())),
        AccountStatus::Deleted => Err(Error::Unauthorized("This account has been deleted".into())),
        other => {
            debug_assert!(other.can_sign_in());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{ProfileDocuments, Role};
    use crate::services::memory_store::{account, MemoryAccountStore};

    fn service_with(status: AccountStatus) -> (AuthService, Arc<MemoryAccountStore>, Account) {
        let store = Arc::new(MemoryAccountStore::default());
        let acc = account(Role::Jobseeker, status);
        store.insert(
            acc.clone(),
            crypto::hash_password("s3cret-pass").unwrap(),
            ProfileDocuments::default(),
        );
        (AuthService::new(store.clone(), "test_secret".into(), 1), store, acc)
    }

    #[tokio::test]
    async fn active_account_logs_in_and_token_resolves() {
        let (auth, _, acc) = service_with(AccountStatus::Active);
        let result = auth.login(&acc.email, "s3cret-pass").await.unwrap();
        let session = auth.authenticate(&result.token).await.unwrap();
        assert_eq!(session.user_id, acc.id);
        assert_eq!(session.role, Role::Jobseeker);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (auth, _, acc) = service_with(AccountStatus::Active);
        let err = auth.login(&acc.email, "nope").await.err().unwrap();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn suspended_and_deleted_accounts_cannot_log_in() {
        for status in [AccountStatus::Suspended, AccountStatus::Deleted] {
            let (auth, _, acc) = service_with(status);
            let err = auth.login(&acc.email, "s3cret-pass").await.err().unwrap();
            assert!(matches!(err, Error::Unauthorized(_)), "{:?}", status);
        }
    }

    #[tokio::test]
    async fn unverified_account_can_log_in_to_upload_documents() {
        let (auth, _, acc) = service_with(AccountStatus::Unverified);
        tokio_test::assert_ok!(auth.login(&acc.email, "s3cret-pass").await);
    }

    #[tokio::test]
    async fn existing_token_stops_working_after_suspension() {
        let (auth, store, acc) = service_with(AccountStatus::Active);
        let token = auth.login(&acc.email, "s3cret-pass").await.unwrap().token;

        store
            .transition_status(acc.id, AccountStatus::Active, AccountStatus::Suspended, Some("spam"))
            .await
            .unwrap();

        let err = auth.authenticate(&token).await.err().unwrap();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
