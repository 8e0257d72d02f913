use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationEvent, ApplicationRow, ApplicationStatus};
use crate::models::job::JobStatus;
use crate::models::notification::NotificationKind;
use crate::services::application_store::{append_event, ApplicationStore, APPLICATION_COLUMNS};
use crate::services::notifier::Notifier;

/// Employer decisions on applications.
#[derive(Clone)]
pub struct ApplicationReview {
    store: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApplicationReview {
    pub fn new(store: Arc<dyn ApplicationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Only the employer owning the job may decide. Anyone else, including
    /// callers probing unknown ids, gets the same `Forbidden`.
    pub async fn set_status(
        &self,
        employer_user_id: Uuid,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<Application> {
        let parties = self
            .store
            .parties(application_id)
            .await?
            .filter(|p| p.employer_user_id == employer_user_id)
            .ok_or(Error::Forbidden)?;
        let current = parties.status;

        if !current.can_move_to(next) {
            return Err(Error::InvalidTransition(format!(
                "Cannot change an application from {} to {}",
                current, next
            )));
        }

        let message = next.applicant_message(&parties.job_title);
        let application = self
            .store
            .transition(application_id, current, next, &message)
            .await?
            .ok_or_else(|| {
                Error::Conflict("Application status changed, please refresh and try again".into())
            })?;

        tracing::info!(%application_id, from = %current, to = %next, "application status changed");

        if let Err(e) = self
            .notifier
            .create_in_app_notification(
                parties.applicant_user_id,
                NotificationKind::ApplicationUpdated,
                &message,
            )
            .await
        {
            tracing::warn!(%application_id, error = %e, "failed to notify applicant");
        }

        Ok(application)
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    review: ApplicationReview,
}

impl ApplicationService {
    pub fn new(
        pool: PgPool,
        store: Arc<dyn ApplicationStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            review: ApplicationReview::new(store, notifier),
        }
    }

    /// One application per job and job seeker, active jobs only.
    pub async fn apply(
        &self,
        jobseeker_user_id: Uuid,
        job_id: Uuid,
        cover_letter: Option<String>,
    ) -> Result<Application> {
        let jobseeker_id: Uuid =
            sqlx::query_scalar("SELECT id FROM jobseekers WHERE user_id = $1")
                .bind(jobseeker_user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(Error::Forbidden)?;

        let job: Option<(String, String, Uuid)> = sqlx::query_as(
            r#"
            SELECT j.status, j.title, e.user_id
            FROM jobs j
            JOIN employers e ON e.id = j.employer_id
            WHERE j.id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some((status, title, employer_user_id)) = job else {
            return Err(Error::NotFound("Job not found".into()));
        };
        if status != JobStatus::Active.as_str() {
            return Err(Error::BadRequest("This job is no longer accepting applications".into()));
        }

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (job_id, jobseeker_id, cover_letter, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .bind(jobseeker_id)
        .bind(cover_letter.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                Error::Conflict("You have already applied to this job".into())
            }
            _ => Error::from(e),
        })?;
        let application = Application::try_from(row)?;

        append_event(
            &mut tx,
            application.id,
            "submitted",
            &ApplicationStatus::Pending.applicant_message(&title),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(application_id = %application.id, %job_id, "application submitted");

        if let Err(e) = self
            .review
            .notifier
            .create_in_app_notification(
                employer_user_id,
                NotificationKind::ApplicationReceived,
                &format!("New application received for {}.", title),
            )
            .await
        {
            tracing::warn!(application_id = %application.id, error = %e, "failed to notify employer");
        }

        Ok(application)
    }

    pub async fn set_status(
        &self,
        employer_user_id: Uuid,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<Application> {
        self.review
            .set_status(employer_user_id, application_id, next)
            .await
    }

    pub async fn list_for_jobseeker(&self, jobseeker_user_id: Uuid) -> Result<Vec<Application>> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT a.id, a.job_id, a.jobseeker_id, a.cover_letter, a.status, a.created_at, a.updated_at
            FROM applications a
            JOIN jobseekers js ON js.id = a.jobseeker_id
            WHERE js.user_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(jobseeker_user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Application::try_from)
        .collect()
    }

    pub async fn list_for_job(&self, employer_user_id: Uuid, job_id: Uuid) -> Result<Vec<Application>> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            "SELECT e.user_id FROM jobs j JOIN employers e ON e.id = j.employer_id WHERE j.id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        if owner != Some(employer_user_id) {
            return Err(Error::Forbidden);
        }

        sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Application::try_from)
        .collect()
    }

    /// Event history, visible to the owning employer and the applicant.
    pub async fn events(&self, user_id: Uuid, application_id: Uuid) -> Result<Vec<ApplicationEvent>> {
        let parties = self
            .review
            .store
            .parties(application_id)
            .await?
            .filter(|p| p.employer_user_id == user_id || p.applicant_user_id == user_id)
            .ok_or(Error::Forbidden)?;
        tracing::debug!(%application_id, status = %parties.status, "loading application events");

        let events = sqlx::query_as::<_, ApplicationEvent>(
            r#"
            SELECT id, application_id, event_type, message, created_at
            FROM application_events
            WHERE application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::application_store::ApplicationParties;
    use crate::services::notifier::MockNotifier;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::Barrier;
    use ApplicationStatus::*;

    struct Stored {
        parties: ApplicationParties,
        application: Application,
        events: Vec<String>,
    }

    /// In-memory store with the same compare-and-swap rule as Postgres. With a
    /// barrier, every `parties` read waits until all racers have read.
    #[derive(Default)]
    struct MemoryApplications {
        rows: Mutex<HashMap<Uuid, Stored>>,
        barrier: Option<Barrier>,
    }

    impl MemoryApplications {
        fn lockstep(racers: usize) -> Self {
            Self {
                rows: Mutex::default(),
                barrier: Some(Barrier::new(racers)),
            }
        }

        fn seed(&self, status: ApplicationStatus) -> (Uuid, Uuid) {
            let employer = Uuid::new_v4();
            let application = Application {
                id: Uuid::new_v4(),
                job_id: Uuid::new_v4(),
                jobseeker_id: Uuid::new_v4(),
                cover_letter: None,
                status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let id = application.id;
            self.rows.lock().unwrap().insert(
                id,
                Stored {
                    parties: ApplicationParties {
                        status,
                        job_title: "Line Cook".into(),
                        employer_user_id: employer,
                        applicant_user_id: Uuid::new_v4(),
                    },
                    application,
                    events: Vec::new(),
                },
            );
            (id, employer)
        }

        fn status_of(&self, id: Uuid) -> ApplicationStatus {
            self.rows.lock().unwrap()[&id].application.status
        }

        fn events_of(&self, id: Uuid) -> Vec<String> {
            self.rows.lock().unwrap()[&id].events.clone()
        }
    }

    #[async_trait]
    impl ApplicationStore for MemoryApplications {
        async fn parties(&self, application_id: Uuid) -> Result<Option<ApplicationParties>> {
            let found = self.rows.lock().unwrap().get(&application_id).map(|s| {
                let mut parties = s.parties.clone();
                parties.status = s.application.status;
                parties
            });
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            Ok(found)
        }

        async fn transition(
            &self,
            application_id: Uuid,
            from: ApplicationStatus,
            to: ApplicationStatus,
            _message: &str,
        ) -> Result<Option<Application>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(stored) = rows.get_mut(&application_id) else {
                return Ok(None);
            };
            if stored.application.status != from {
                return Ok(None);
            }
            stored.application.status = to;
            stored.events.push(to.as_str().to_string());
            Ok(Some(stored.application.clone()))
        }
    }

    fn review(store: Arc<MemoryApplications>, notifier: MockNotifier) -> ApplicationReview {
        ApplicationReview::new(store, Arc::new(notifier))
    }

    fn notifier_expecting_updates(times: usize) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .times(times)
            .withf(|_, kind, message| {
                *kind == NotificationKind::ApplicationUpdated && message.contains("Line Cook")
            })
            .returning(|_, _, _| Ok(Uuid::new_v4()));
        notifier
    }

    #[tokio::test]
    async fn shortlisted_candidate_can_be_hired_with_one_event_per_step() {
        let store = Arc::new(MemoryApplications::default());
        let (id, employer) = store.seed(Pending);
        let review = review(store.clone(), notifier_expecting_updates(2));

        let shortlisted = review.set_status(employer, id, Shortlisted).await.unwrap();
        assert_eq!(shortlisted.status, Shortlisted);
        let hired = review.set_status(employer, id, Hired).await.unwrap();
        assert_eq!(hired.status, Hired);

        assert_eq!(store.status_of(id), Hired);
        assert_eq!(store.events_of(id), vec!["shortlisted", "hired"]);
    }

    #[tokio::test]
    async fn another_employer_cannot_decide() {
        let store = Arc::new(MemoryApplications::default());
        let (id, _owner) = store.seed(Pending);
        // No expectations: any notification attempt panics.
        let review = review(store.clone(), MockNotifier::new());

        let err = review.set_status(Uuid::new_v4(), id, Hired).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden));
        let err = review
            .set_status(Uuid::new_v4(), Uuid::new_v4(), Hired)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden));

        assert_eq!(store.status_of(id), Pending);
        assert!(store.events_of(id).is_empty());
    }

    #[tokio::test]
    async fn refused_transitions_write_no_event() {
        let store = Arc::new(MemoryApplications::default());
        let (hired, employer) = store.seed(Hired);
        let review = review(store.clone(), MockNotifier::new());

        for next in [Rejected, Pending, Hired] {
            let err = review.set_status(employer, hired, next).await.unwrap_err();
            assert!(matches!(err, Error::InvalidTransition(_)), "{:?}", next);
        }
        assert_eq!(store.status_of(hired), Hired);
        assert!(store.events_of(hired).is_empty());
    }

    #[tokio::test]
    async fn racing_decisions_leave_one_winner_and_one_conflict() {
        let store = Arc::new(MemoryApplications::lockstep(2));
        let (id, employer) = store.seed(Pending);
        let review = review(store.clone(), notifier_expecting_updates(1));

        let (shortlist, reject) = tokio::join!(
            review.set_status(employer, id, Shortlisted),
            review.set_status(employer, id, Rejected),
        );

        let results = [shortlist, reject];
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(Error::Conflict(_))))
            .count();
        assert_eq!(winners.len(), 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.status_of(id), winners[0].status);
        assert_eq!(store.events_of(id).len(), 1);
    }

    #[tokio::test]
    async fn notification_failure_does_not_undo_the_decision() {
        let store = Arc::new(MemoryApplications::default());
        let (id, employer) = store.seed(Reviewed);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_create_in_app_notification()
            .times(1)
            .returning(|_, _, _| Err(Error::Internal("db down".into())));

        let application = review(store.clone(), notifier)
            .set_status(employer, id, Rejected)
            .await
            .unwrap();
        assert_eq!(application.status, Rejected);
        assert_eq!(store.events_of(id), vec!["rejected"]);
    }
}
