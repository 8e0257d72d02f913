//! Account verification lifecycle.
//!
//! ```text
//! unverified --owner requests review--> under_review --approve--> active
//!                                       under_review --reject---> rejected
//! active --suspend--> suspended        rejected/suspended --approve|reactivate--> active
//! any but deleted --delete--> deleted (terminal)
//! ```
//!
//! The status write is a single compare-and-swap through [`AccountStore`].
//! Everything after it (document cleanup, notifications) is best-effort: a
//! failure becomes a warning for the admin and never undoes the transition.

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::{Account, AccountStatus, AdminAction, DocumentKind, Role};
use crate::models::notification::NotificationKind;
use crate::models::session::Session;
use crate::services::account_store::AccountStore;
use crate::services::document_storage::DocumentStorage;
use crate::services::notifier::{Notifier, StatusEmail};
use crate::utils::html::escape_html;
use crate::utils::validation::require_reason;

pub const STATUS_EVENT: &str = "account_status_changed";

#[derive(Debug)]
pub struct TransitionOutcome {
    pub account: Account,
    pub previous: AccountStatus,
    /// Side effects that failed after the status change committed.
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    documents: DocumentStorage,
    portal_base_url: Url,
}

impl LifecycleService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        documents: DocumentStorage,
        portal_base_url: &str,
    ) -> Result<Self> {
        let mut base = portal_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let portal_base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid PORTAL_BASE_URL: {}", e)))?;
        Ok(Self {
            store,
            notifier,
            documents,
            portal_base_url,
        })
    }

    async fn load(&self, id: Uuid) -> Result<Account> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Account not found".into()))
    }

    /// Stores a verification document for the caller's own profile.
    pub async fn upload_document(
        &self,
        session: &Session,
        kind: DocumentKind,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        let account = self.load(session.user_id).await?;
        if account.role == Role::Admin {
            return Err(Error::Forbidden);
        }
        if !matches!(account.status, AccountStatus::Unverified | AccountStatus::Rejected) {
            return Err(Error::InvalidTransition(format!(
                "Documents cannot be changed while the account is {}",
                account.status
            )));
        }

        let path = self.documents.save(filename, data).await?;
        let previous = match self.store.set_document(&account, kind, &path).await {
            Ok(previous) => previous,
            Err(e) => {
                let _ = self.documents.remove(&path).await;
                return Err(e);
            }
        };
        if let Some(old) = previous {
            if let Err(e) = self.documents.remove(&old).await {
                tracing::warn!(user_id = %account.id, path = %old, error = %e, "failed to delete replaced document");
            }
        }

        tracing::info!(user_id = %account.id, ?kind, "verification document uploaded");
        Ok(path)
    }

    /// Owner side: `unverified -> under_review`, only with both documents present.
    pub async fn request_review(&self, session: &Session) -> Result<Account> {
        let account = self.load(session.user_id).await?;
        if account.role == Role::Admin {
            return Err(Error::Forbidden);
        }
        match account.status {
            AccountStatus::Unverified => {}
            AccountStatus::UnderReview => {
                return Err(Error::InvalidTransition(
                    "Your account is already under review".into(),
                ))
            }
            AccountStatus::Rejected => {
                return Err(Error::InvalidTransition(
                    "Rejected accounts are re-reviewed by an administrator once new documents are uploaded"
                        .into(),
                ))
            }
            other => {
                return Err(Error::InvalidTransition(format!(
                    "Approval cannot be requested for an account that is {}",
                    other
                )))
            }
        }

        let documents = self.store.documents(&account).await?;
        if !documents.is_complete() {
            return Err(Error::BadRequest(
                "Upload both a face photo and a valid ID before requesting approval".into(),
            ));
        }

        let updated = self
            .store
            .transition_status(
                account.id,
                AccountStatus::Unverified,
                AccountStatus::UnderReview,
                None,
            )
            .await?
            .ok_or_else(Error::state_changed)?;

        tracing::info!(user_id = %updated.id, role = %updated.role, "account submitted for review");
        Ok(updated)
    }

    /// Admin side transitions. Validation, authorization and precondition
    /// failures happen before any write.
    pub async fn apply_admin_action(
        &self,
        actor: &Session,
        account_id: Uuid,
        action: AdminAction,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome> {
        actor.require_role(Role::Admin)?;
        let reason = if action.requires_reason() {
            Some(require_reason(reason)?)
        } else {
            None
        };

        let account = self.load(account_id).await?;
        if account.role == Role::Admin {
            return Err(Error::Forbidden);
        }

        let target = action.target();
        if account.status == target {
            return Err(Error::InvalidTransition(format!(
                "Account is already {}",
                target
            )));
        }
        if !action.allowed_from(account.status) {
            return Err(Error::InvalidTransition(format!(
                "Cannot {} an account that is {}",
                action.as_str(),
                account.status
            )));
        }

        let previous = account.status;
        let updated = self
            .store
            .transition_status(account.id, previous, target, reason.as_deref())
            .await?
            .ok_or_else(|| {
                tracing::info!(%account_id, action = action.as_str(), "status changed concurrently");
                Error::state_changed()
            })?;

        tracing::info!(
            admin_id = %actor.user_id,
            %account_id,
            from = %previous,
            to = %target,
            action = action.as_str(),
            "account status changed"
        );

        let warnings = self.after_transition(&updated, reason.as_deref()).await;
        Ok(TransitionOutcome {
            account: updated,
            previous,
            warnings,
        })
    }

    async fn after_transition(&self, account: &Account, reason: Option<&str>) -> Vec<String> {
        let mut warnings = Vec::new();

        if account.status == AccountStatus::Rejected {
            self.discard_documents(account, &mut warnings).await;
        }

        let Some(notice) = StatusNotice::for_status(account.status, reason) else {
            return warnings;
        };

        if let Err(e) = self
            .notifier
            .create_in_app_notification(account.id, notice.kind, &notice.message)
            .await
        {
            tracing::warn!(user_id = %account.id, error = %e, "failed to create in-app notification");
            warnings.push("Status updated, but the in-app notification could not be created".into());
        }

        let email = self.status_email(account, &notice);
        if let Err(e) = self.notifier.send_status_email(&email).await {
            tracing::warn!(user_id = %account.id, to = %email.to, error = %e, "failed to send status email");
            warnings.push("Status updated, but the email notification could not be sent".into());
        }

        self.notifier
            .publish_realtime_status_event(
                account.id,
                STATUS_EVENT,
                &notice.message,
                reason.map(str::to_string),
            )
            .await;

        warnings
    }

    async fn discard_documents(&self, account: &Account, warnings: &mut Vec<String>) {
        let documents = match self.store.documents(account).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(user_id = %account.id, error = %e, "failed to read documents for cleanup");
                warnings.push("Status updated, but the uploaded documents could not be cleared".into());
                return;
            }
        };

        if let Err(e) = self.store.clear_documents(account).await {
            tracing::warn!(user_id = %account.id, error = %e, "failed to clear document references");
            warnings.push("Status updated, but the uploaded documents could not be cleared".into());
            return;
        }

        for path in documents.paths() {
            if let Err(e) = self.documents.remove(path).await {
                tracing::warn!(user_id = %account.id, path, error = %e, "failed to delete document file");
                warnings.push("Status updated, but a document file could not be deleted".into());
            }
        }
    }

    fn link(&self, path: &str) -> String {
        self.portal_base_url
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| self.portal_base_url.to_string())
    }

    fn status_email(&self, account: &Account, notice: &StatusNotice) -> StatusEmail {
        let (cta_label, cta_url) = if account.status == AccountStatus::Active {
            ("Go to your dashboard", self.link(account.role.dashboard_path()))
        } else {
            ("Contact support", self.link("contact"))
        };
        let name = account.full_name();

        let html_body = format!(
            "<p>Hi {name},</p><p>{message}</p><p><a href=\"{url}\">{label}</a></p>\
             <p>The BagoScout Team</p>",
            name = escape_html(&name),
            message = escape_html(&notice.message),
            url = escape_html(&cta_url),
            label = escape_html(cta_label),
        );

        StatusEmail {
            to: account.email.clone(),
            recipient_name: name,
            subject: notice.subject.to_string(),
            html_body,
            cta_label: cta_label.to_string(),
            cta_url,
        }
    }
}

/// Text shared by the email, in-app and realtime notifications of one change.
struct StatusNotice {
    kind: NotificationKind,
    subject: &'static str,
    message: String,
}

impl StatusNotice {
    fn for_status(status: AccountStatus, reason: Option<&str>) -> Option<Self> {
        let reason = reason.unwrap_or("No reason given");
        let notice = match status {
            AccountStatus::Active => Self {
                kind: NotificationKind::AccountApproved,
                subject: "Your BagoScout account has been approved",
                message: "Your account has been approved. You now have full access to BagoScout."
                    .to_string(),
            },
            AccountStatus::Rejected => Self {
                kind: NotificationKind::AccountRejected,
                subject: "Your BagoScout account verification was rejected",
                message: format!(
                    "Your account verification was rejected. Reason: {}. Upload new documents \
                     and an administrator will review your account again.",
                    reason
                ),
            },
            AccountStatus::Suspended => Self {
                kind: NotificationKind::AccountSuspended,
                subject: "Your BagoScout account has been suspended",
                message: format!("Your account has been suspended. Reason: {}", reason),
            },
            AccountStatus::Deleted => Self {
                kind: NotificationKind::AccountDeleted,
                subject: "Your BagoScout account has been deleted",
                message: format!("Your account has been deleted. Reason: {}", reason),
            },
            AccountStatus::Unverified | AccountStatus::UnderReview => return None,
        };
        Some(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::ProfileDocuments;
    use crate::services::memory_store::{account, MemoryAccountStore};
    use crate::services::notifier::MockNotifier;
    use crate::services::auth_service::AuthService;
    use crate::utils::crypto;
    use async_trait::async_trait;
    use tokio::sync::Barrier;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const PDF: &[u8] = b"%PDF-1.7 test";

    fn admin() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            status: AccountStatus::Active,
        }
    }

    fn owner(acc: &Account) -> Session {
        Session {
            user_id: acc.id,
            role: acc.role,
            status: acc.status,
        }
    }

    fn scratch_storage() -> DocumentStorage {
        DocumentStorage::new(std::env::temp_dir().join(format!("bagoscout-{}", Uuid::new_v4())))
    }

    fn service(store: Arc<dyn AccountStore>, notifier: MockNotifier) -> LifecycleService {
        LifecycleService::new(
            store,
            Arc::new(notifier),
            scratch_storage(),
            "https://bagoscout.example",
        )
        .unwrap()
    }

    fn seeded(role: Role, status: AccountStatus) -> (Arc<MemoryAccountStore>, Account) {
        let store = Arc::new(MemoryAccountStore::default());
        let acc = account(role, status);
        store.insert(acc.clone(), String::new(), ProfileDocuments::default());
        (store, acc)
    }

    /// Expects exactly one in-app notification, one email and one realtime event.
    fn notifier_expecting(kind: NotificationKind, needle: &'static str) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .times(1)
            .withf(move |_, k, message| *k == kind && message.contains(needle))
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier
            .expect_send_status_email()
            .times(1)
            .withf(move |email| email.html_body.contains(needle))
            .returning(|_| Ok(()));
        notifier
            .expect_publish_realtime_status_event()
            .times(1)
            .returning(|_, _, _, _| ());
        notifier
    }

    #[tokio::test]
    async fn approving_under_review_activates_and_notifies_once() {
        let (store, acc) = seeded(Role::Employer, AccountStatus::UnderReview);
        let lifecycle = service(
            store.clone(),
            notifier_expecting(NotificationKind::AccountApproved, "approved"),
        );

        let outcome = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Approve, None)
            .await
            .unwrap();

        assert_eq!(outcome.account.status, AccountStatus::Active);
        assert_eq!(outcome.previous, AccountStatus::UnderReview);
        assert!(outcome.warnings.is_empty());
        assert_eq!(store.status_of(acc.id), AccountStatus::Active);
    }

    #[tokio::test]
    async fn approval_email_links_to_role_dashboard() {
        let (store, acc) = seeded(Role::Jobseeker, AccountStatus::UnderReview);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier
            .expect_send_status_email()
            .times(1)
            .withf(|email| {
                email.cta_url == "https://bagoscout.example/jobseeker/dashboard"
                    && email.subject.contains("approved")
            })
            .returning(|_| Ok(()));
        notifier
            .expect_publish_realtime_status_event()
            .returning(|_, _, _, _| ());

        service(store, notifier)
            .apply_admin_action(&admin(), acc.id, AdminAction::Approve, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reason_is_mandatory_for_reject_suspend_and_delete() {
        let cases = [
            (AdminAction::Reject, AccountStatus::UnderReview),
            (AdminAction::Suspend, AccountStatus::Active),
            (AdminAction::Delete, AccountStatus::Active),
        ];
        for (action, status) in cases {
            for reason in [None, Some(""), Some("   ")] {
                let (store, acc) = seeded(Role::Jobseeker, status);
                // No expectations: any notification attempt panics.
                let lifecycle = service(store.clone(), MockNotifier::new());

                let err = lifecycle
                    .apply_admin_action(&admin(), acc.id, action, reason)
                    .await
                    .unwrap_err();
                assert!(matches!(err, Error::BadRequest(_)), "{:?}", action);
                assert_eq!(store.status_of(acc.id), status);
            }
        }
    }

    #[tokio::test]
    async fn approving_an_active_account_is_an_error_without_notification() {
        let (store, acc) = seeded(Role::Employer, AccountStatus::Active);
        let lifecycle = service(store.clone(), MockNotifier::new());

        let err = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        assert_eq!(store.status_of(acc.id), AccountStatus::Active);
    }

    #[tokio::test]
    async fn deleted_is_terminal() {
        let (store, acc) = seeded(Role::Employer, AccountStatus::Deleted);
        let lifecycle = service(store.clone(), MockNotifier::new());

        for action in [AdminAction::Approve, AdminAction::Reactivate, AdminAction::Suspend] {
            let err = lifecycle
                .apply_admin_action(&admin(), acc.id, action, Some("retry"))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidTransition(_)));
        }
        assert_eq!(store.status_of(acc.id), AccountStatus::Deleted);
    }

    #[tokio::test]
    async fn only_admins_may_run_admin_actions() {
        let (store, acc) = seeded(Role::Jobseeker, AccountStatus::UnderReview);
        let lifecycle = service(store.clone(), MockNotifier::new());
        let employer = Session {
            user_id: Uuid::new_v4(),
            role: Role::Employer,
            status: AccountStatus::Active,
        };

        let err = lifecycle
            .apply_admin_action(&employer, acc.id, AdminAction::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden));
        assert_eq!(store.status_of(acc.id), AccountStatus::UnderReview);
    }

    #[tokio::test]
    async fn admin_accounts_are_not_managed_through_the_lifecycle() {
        let (store, acc) = seeded(Role::Admin, AccountStatus::Active);
        let lifecycle = service(store, MockNotifier::new());
        let err = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Suspend, Some("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden));
    }

    #[tokio::test]
    async fn rejecting_clears_documents_even_when_files_are_missing() {
        let store = Arc::new(MemoryAccountStore::default());
        let acc = account(Role::Employer, AccountStatus::UnderReview);
        let storage = scratch_storage();
        let kept = storage.save("photo.png", PNG).await.unwrap();
        store.insert(
            acc.clone(),
            String::new(),
            ProfileDocuments {
                photo_path: Some(kept.clone()),
                valid_id_path: Some("/nonexistent/bagoscout/id.pdf".into()),
            },
        );

        let lifecycle = LifecycleService::new(
            store.clone(),
            Arc::new(notifier_expecting(NotificationKind::AccountRejected, "blurry photo")),
            storage,
            "https://bagoscout.example/",
        )
        .unwrap();

        let outcome = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Reject, Some("blurry photo"))
            .await
            .unwrap();

        assert_eq!(outcome.account.status, AccountStatus::Rejected);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(store.documents_of(acc.id), ProfileDocuments::default());
        assert!(tokio::fs::metadata(&kept).await.is_err());
    }

    #[tokio::test]
    async fn email_failure_is_a_warning_not_a_rollback() {
        let (store, acc) = seeded(Role::Jobseeker, AccountStatus::Active);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .times(1)
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier
            .expect_send_status_email()
            .times(1)
            .returning(|_| Err(Error::Internal("relay down".into())));
        notifier
            .expect_publish_realtime_status_event()
            .returning(|_, _, _, _| ());

        let outcome = service(store.clone(), notifier)
            .apply_admin_action(&admin(), acc.id, AdminAction::Suspend, Some("spam"))
            .await
            .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("email"));
        assert_eq!(store.status_of(acc.id), AccountStatus::Suspended);
    }

    /// Holds every `find` until two callers have read, forcing both racers to
    /// see the same starting status.
    struct LockstepStore {
        inner: Arc<MemoryAccountStore>,
        barrier: Barrier,
    }

    #[async_trait]
    impl AccountStore for LockstepStore {
        async fn find(&self, id: Uuid) -> Result<Option<Account>> {
            let found = self.inner.find(id).await;
            self.barrier.wait().await;
            found
        }
        async fn find_credentials(&self, email: &str) -> Result<Option<(Account, String)>> {
            self.inner.find_credentials(email).await
        }
        async fn record_login(&self, id: Uuid) -> Result<()> {
            self.inner.record_login(id).await
        }
        async fn documents(&self, account: &Account) -> Result<ProfileDocuments> {
            self.inner.documents(account).await
        }
        async fn set_document(
            &self,
            account: &Account,
            kind: DocumentKind,
            path: &str,
        ) -> Result<Option<String>> {
            self.inner.set_document(account, kind, path).await
        }
        async fn clear_documents(&self, account: &Account) -> Result<()> {
            self.inner.clear_documents(account).await
        }
        async fn transition_status(
            &self,
            id: Uuid,
            from: AccountStatus,
            to: AccountStatus,
            reason: Option<&str>,
        ) -> Result<Option<Account>> {
            self.inner.transition_status(id, from, to, reason).await
        }
    }

    #[tokio::test]
    async fn concurrent_approve_and_reject_have_exactly_one_winner() {
        let (inner, acc) = seeded(Role::Employer, AccountStatus::UnderReview);
        let store = Arc::new(LockstepStore {
            inner: inner.clone(),
            barrier: Barrier::new(2),
        });

        // Whichever action wins notifies once; the loser must not notify.
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .times(1)
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier.expect_send_status_email().times(1).returning(|_| Ok(()));
        notifier
            .expect_publish_realtime_status_event()
            .times(1)
            .returning(|_, _, _, _| ());
        let lifecycle = service(store, notifier);

        let (a, b) = (admin(), admin());
        let (approve, reject) = tokio::join!(
            lifecycle.apply_admin_action(&a, acc.id, AdminAction::Approve, None),
            lifecycle.apply_admin_action(&b, acc.id, AdminAction::Reject, Some("duplicate")),
        );

        let results = [approve.map(|o| o.account.status), reject.map(|o| o.account.status)];
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(Error::Conflict(_))))
            .count();

        assert_eq!(winners.len(), 1);
        assert_eq!(conflicts, 1);
        assert_eq!(inner.status_of(acc.id), *winners[0]);
    }

    #[tokio::test]
    async fn owner_registers_uploads_requests_and_gets_approved() {
        let (store, acc) = seeded(Role::Employer, AccountStatus::Unverified);
        let lifecycle = service(
            store.clone(),
            notifier_expecting(NotificationKind::AccountApproved, "approved"),
        );
        let me = owner(&acc);

        let err = lifecycle.request_review(&me).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(store.status_of(acc.id), AccountStatus::Unverified);

        lifecycle
            .upload_document(&me, DocumentKind::Photo, "me.png", PNG)
            .await
            .unwrap();
        lifecycle
            .upload_document(&me, DocumentKind::ValidId, "license.pdf", PDF)
            .await
            .unwrap();
        assert!(store.documents_of(acc.id).is_complete());

        let submitted = lifecycle.request_review(&me).await.unwrap();
        assert_eq!(submitted.status, AccountStatus::UnderReview);

        let again = lifecycle.request_review(&me).await.unwrap_err();
        assert!(matches!(again, Error::InvalidTransition(_)));

        let outcome = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Approve, None)
            .await
            .unwrap();
        assert_eq!(outcome.account.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn rejected_account_reuploads_and_is_approved_by_an_admin() {
        let (store, acc) = seeded(Role::Jobseeker, AccountStatus::Rejected);
        let lifecycle = service(
            store.clone(),
            notifier_expecting(NotificationKind::AccountApproved, "approved"),
        );
        let me = owner(&acc);

        lifecycle
            .upload_document(&me, DocumentKind::Photo, "retake.png", PNG)
            .await
            .unwrap();
        lifecycle
            .upload_document(&me, DocumentKind::ValidId, "passport.pdf", PDF)
            .await
            .unwrap();
        assert!(store.documents_of(acc.id).is_complete());

        // The owner cannot queue a rejected account; the admin decides directly.
        let err = lifecycle.request_review(&me).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(ref m) if m.contains("administrator")));
        assert_eq!(store.status_of(acc.id), AccountStatus::Rejected);

        let outcome = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Approve, None)
            .await
            .unwrap();
        assert_eq!(outcome.previous, AccountStatus::Rejected);
        assert_eq!(outcome.account.status, AccountStatus::Active);
        assert!(store.documents_of(acc.id).is_complete());
    }

    #[tokio::test]
    async fn rejection_notice_points_to_admin_re_review() {
        let (store, acc) = seeded(Role::Employer, AccountStatus::UnderReview);
        let lifecycle = service(
            store,
            notifier_expecting(NotificationKind::AccountRejected, "administrator will review"),
        );
        lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Reject, Some("expired ID"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn suspended_jobseeker_is_told_why_and_cannot_log_in() {
        let store = Arc::new(MemoryAccountStore::default());
        let acc = account(Role::Jobseeker, AccountStatus::Active);
        store.insert(
            acc.clone(),
            crypto::hash_password("hunter22").unwrap(),
            ProfileDocuments::default(),
        );
        let lifecycle = service(
            store.clone(),
            notifier_expecting(NotificationKind::AccountSuspended, "policy violation"),
        );

        let outcome = lifecycle
            .apply_admin_action(&admin(), acc.id, AdminAction::Suspend, Some("policy violation"))
            .await
            .unwrap();
        assert_eq!(outcome.account.status, AccountStatus::Suspended);
        assert_eq!(outcome.account.status_reason.as_deref(), Some("policy violation"));

        let auth = AuthService::new(store, "secret".into(), 1);
        let err = auth.login(&acc.email, "hunter22").await.err().unwrap();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn reason_is_escaped_in_the_email_body() {
        let (store, acc) = seeded(Role::Jobseeker, AccountStatus::Active);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier
            .expect_send_status_email()
            .times(1)
            .withf(|email| {
                email.html_body.contains("&lt;b&gt;spam&lt;/b&gt;") && !email.html_body.contains("<b>")
            })
            .returning(|_| Ok(()));
        notifier
            .expect_publish_realtime_status_event()
            .returning(|_, _, _, _| ());

        service(store, notifier)
            .apply_admin_action(&admin(), acc.id, AdminAction::Suspend, Some("<b>spam</b>"))
            .await
            .unwrap();
    }
}
