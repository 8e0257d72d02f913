//! In-process [`AccountStore`] used by unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, AccountStatus, DocumentKind, ProfileDocuments, Role};
use crate::services::account_store::AccountStore;

struct Record {
    account: Account,
    password_hash: String,
    documents: ProfileDocuments,
}

#[derive(Default)]
pub struct MemoryAccountStore {
    records: Mutex<HashMap<Uuid, Record>>,
}

pub fn account(role: Role, status: AccountStatus) -> Account {
    let id = Uuid::new_v4();
    let now = Utc::now();
    Account {
        id,
        role,
        status,
        email: format!("user-{}@example.com", id.simple()),
        first_name: "Maria".to_string(),
        last_name: "Santos".to_string(),
        phone: None,
        status_reason: None,
        created_at: now,
        updated_at: now,
        last_login_at: None,
    }
}

impl MemoryAccountStore {
    pub fn insert(&self, account: Account, password_hash: String, documents: ProfileDocuments) {
        self.records.lock().unwrap().insert(
            account.id,
            Record {
                account,
                password_hash,
                documents,
            },
        );
    }

    pub fn status_of(&self, id: Uuid) -> AccountStatus {
        self.records.lock().unwrap()[&id].account.status
    }

    pub fn documents_of(&self, id: Uuid) -> ProfileDocuments {
        self.records.lock().unwrap()[&id].documents.clone()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&id)
            .map(|r| r.account.clone()))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(Account, String)>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.account.email.eq_ignore_ascii_case(email))
            .map(|r| (r.account.clone(), r.password_hash.clone())))
    }

    async fn record_login(&self, id: Uuid) -> Result<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.account.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn documents(&self, account: &Account) -> Result<ProfileDocuments> {
        Ok(self.documents_of(account.id))
    }

    async fn set_document(
        &self,
        account: &Account,
        kind: DocumentKind,
        path: &str,
    ) -> Result<Option<String>> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&account.id)
            .ok_or_else(|| Error::NotFound("Account not found".into()))?;
        let slot = match kind {
            DocumentKind::Photo => &mut record.documents.photo_path,
            DocumentKind::ValidId => &mut record.documents.valid_id_path,
        };
        Ok(slot.replace(path.to_string()))
    }

    async fn clear_documents(&self, account: &Account) -> Result<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&account.id) {
            record.documents = ProfileDocuments::default();
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AccountStatus,
        to: AccountStatus,
        reason: Option<&str>,
    ) -> Result<Option<Account>> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        if record.account.status != from {
            return Ok(None);
        }
        record.account.status = to;
        record.account.status_reason = reason.map(str::to_string);
        record.account.updated_at = Utc::now();
        Ok(Some(record.account.clone()))
    }
}
