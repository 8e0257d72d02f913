//! Persistence for employer decisions on applications.
//!
//! [`ApplicationStore::transition`] writes the new status with a
//! compare-and-swap and appends the matching event row in the same
//! transaction, so an event exists for every status change and for nothing else.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationRow, ApplicationStatus};

pub(crate) const APPLICATION_COLUMNS: &str =
    "id, job_id, jobseeker_id, cover_letter, status, created_at, updated_at";

/// Who is on either side of an application, and where it stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationParties {
    pub status: ApplicationStatus,
    pub job_title: String,
    pub employer_user_id: Uuid,
    pub applicant_user_id: Uuid,
}

#[derive(Debug, FromRow)]
struct PartiesRow {
    status: String,
    job_title: String,
    employer_user_id: Uuid,
    applicant_user_id: Uuid,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn parties(&self, application_id: Uuid) -> Result<Option<ApplicationParties>>;

    /// Moves the application from `from` to `to` and records one event.
    /// Returns `None`, writing nothing, when the stored status is no longer `from`.
    async fn transition(
        &self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        message: &str,
    ) -> Result<Option<Application>>;
}

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) async fn append_event(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    application_id: Uuid,
    event_type: &str,
    message: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO application_events (application_id, event_type, message) VALUES ($1, $2, $3)",
    )
    .bind(application_id)
    .bind(event_type)
    .bind(message)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn parties(&self, application_id: Uuid) -> Result<Option<ApplicationParties>> {
        let row = sqlx::query_as::<_, PartiesRow>(
            r#"
            SELECT a.status, j.title AS job_title, e.user_id AS employer_user_id,
                   js.user_id AS applicant_user_id
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN employers e ON e.id = j.employer_id
            JOIN jobseekers js ON js.id = a.jobseeker_id
            WHERE a.id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(ApplicationParties {
                status: r.status.parse()?,
                job_title: r.job_title,
                employer_user_id: r.employer_user_id,
                applicant_user_id: r.applicant_user_id,
            })
        })
        .transpose()
    }

    async fn transition(
        &self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        message: &str,
    ) -> Result<Option<Application>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(to.as_str())
        .bind(application_id)
        .bind(from.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let application = Application::try_from(row)?;
        append_event(&mut tx, application_id, to.as_str(), message).await?;
        tx.commit().await?;
        Ok(Some(application))
    }
}
