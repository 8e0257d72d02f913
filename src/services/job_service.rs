use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{
    CreateJobPayload, JobListQuery, JobListResponse, MapPoint, UpdateJobPayload,
};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobRow, JobStatus};
use crate::utils::validation::normalize_skills;

const JOB_COLUMNS: &str = "id, employer_id, title, description, field, job_type, required_skills, \
     salary_min, salary_max, location, latitude, longitude, status, created_at, updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn employer_id(&self, user_id: Uuid) -> Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM employers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::Forbidden)
    }

    pub async fn create(&self, employer_user_id: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let employer_id = self.employer_id(employer_user_id).await?;
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (
                employer_id, title, description, field, job_type, required_skills,
                salary_min, salary_max, location, latitude, longitude, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(employer_id)
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.field.trim())
        .bind(payload.job_type.trim())
        .bind(normalize_skills(&payload.required_skills))
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.location.trim())
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(JobStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        let job = Job::try_from(row)?;
        tracing::info!(job_id = %job.id, %employer_id, "job posted");
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
        Job::try_from(row)
    }

    /// Public job detail. Paused and closed jobs are hidden.
    pub async fn get_public(&self, id: Uuid) -> Result<Job> {
        let job = self.get(id).await?;
        if job.status != JobStatus::Active {
            return Err(Error::NotFound("Job not found".into()));
        }
        Ok(job)
    }

    /// Loads a job and checks it belongs to the employer. A job owned by
    /// someone else is reported exactly like a missing one would be to them.
    pub async fn get_owned(&self, employer_user_id: Uuid, id: Uuid) -> Result<Job> {
        let employer_id = self.employer_id(employer_user_id).await?;
        let job = self.get(id).await.map_err(|e| match e {
            Error::NotFound(_) => Error::Forbidden,
            other => other,
        })?;
        if job.employer_id != employer_id {
            return Err(Error::Forbidden);
        }
        Ok(job)
    }

    pub async fn list_own(&self, employer_user_id: Uuid) -> Result<Vec<Job>> {
        let employer_id = self.employer_id(employer_user_id).await?;
        sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Job::try_from)
        .collect()
    }

    pub async fn update(
        &self,
        employer_user_id: Uuid,
        id: Uuid,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        let current = self.get_owned(employer_user_id, id).await?;
        let salary_min = payload.salary_min.or(current.salary_min);
        let salary_max = payload.salary_max.or(current.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(Error::BadRequest("salary_min must not exceed salary_max".into()));
            }
        }

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                field = COALESCE($4, field),
                job_type = COALESCE($5, job_type),
                required_skills = COALESCE($6, required_skills),
                salary_min = COALESCE($7, salary_min),
                salary_max = COALESCE($8, salary_max),
                location = COALESCE($9, location),
                latitude = COALESCE($10, latitude),
                longitude = COALESCE($11, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.field)
        .bind(payload.job_type)
        .bind(payload.required_skills.map(|s| normalize_skills(&s)))
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.location)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .fetch_one(&self.pool)
        .await?;
        Job::try_from(row)
    }

    pub async fn set_status(&self, employer_user_id: Uuid, id: Uuid, status: JobStatus) -> Result<Job> {
        self.get_owned(employer_user_id, id).await?;
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(job_id = %id, status = %status, "job status changed");
        Job::try_from(row)
    }

    /// Active jobs with optional search, field and type filters.
    pub async fn list_public(&self, query: JobListQuery) -> Result<JobListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = vec!["status = 'active'".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(field) = query.field.filter(|f| !f.trim().is_empty()) {
            args.push(field.trim().to_string());
            filters.push(format!("field ILIKE ${}", args.len()));
        }
        if let Some(job_type) = query.job_type.filter(|t| !t.trim().is_empty()) {
            args.push(job_type.trim().to_string());
            filters.push(format!("job_type = ${}", args.len()));
        }
        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            args.push(format!("%{}%", search.trim()));
            let n = args.len();
            filters.push(format!(
                "(title ILIKE ${n} OR description ILIKE ${n} OR location ILIKE ${n})"
            ));
        }
        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, JobRow>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Job::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(JobListResponse {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn list_active(&self, limit: i64) -> Result<Vec<Job>> {
        let limit = if limit <= 0 { 200 } else { limit.min(1000) };
        sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE status = 'active' ORDER BY created_at DESC LIMIT $1",
            JOB_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Job::try_from)
        .collect()
    }

    /// Active jobs that can be placed on the map.
    pub async fn map_points(&self) -> Result<Vec<MapPoint>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, String, String, f64, f64)>(
            r#"
            SELECT j.id, j.title, j.field, j.location, e.company_name, j.latitude, j.longitude
            FROM jobs j
            JOIN employers e ON e.id = j.employer_id
            WHERE j.status = 'active' AND j.latitude IS NOT NULL AND j.longitude IS NOT NULL
            ORDER BY j.created_at DESC
            LIMIT 1000
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, field, location, company, latitude, longitude)| MapPoint {
                latitude,
                longitude,
                properties: json!({
                    "id": id,
                    "title": title,
                    "field": field,
                    "location": location,
                    "company": company,
                }),
            })
            .collect())
    }
}
