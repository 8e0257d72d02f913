use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::{
    AccountDetailResponse, AccountListQuery, AccountListResponse, DashboardStats, StatusCount,
};
use crate::dto::auth_dto::RegisterPayload;
use crate::error::{Error, Result};
use crate::models::account::{Account, AccountRow, AccountStatus, ProfileDocuments, Role};
use crate::models::profile::{EmployerProfile, JobseekerProfile, RoleProfile};
use crate::services::account_store::ACCOUNT_COLUMNS;
use crate::utils::crypto;
use crate::utils::validation::normalize_skills;

const EMPLOYER_COLUMNS: &str = "id, user_id, company_name, company_type, address, latitude, longitude, \
     photo_path, valid_id_path, created_at, updated_at";
const JOBSEEKER_COLUMNS: &str = "id, user_id, skills, preferred_field, address, latitude, longitude, \
     photo_path, valid_id_path, created_at, updated_at";

/// Registration, role profiles and the admin account views.
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the account and its role profile in one transaction. New
    /// accounts always start `unverified`.
    pub async fn register(&self, payload: RegisterPayload) -> Result<Account> {
        let company_name = match payload.role {
            Role::Employer => Some(
                payload
                    .company_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::BadRequest("Company name is required for employers".into()))?
                    .to_string(),
            ),
            Role::Jobseeker => None,
            Role::Admin => return Err(Error::Forbidden),
        };
        let email = payload.email.trim().to_lowercase();
        let password_hash = crypto::hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE LOWER(email) = $1")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(Error::Conflict("Email is already registered".into()));
        }

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO users (role, status, email, password_hash, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(payload.role.as_str())
        .bind(AccountStatus::Unverified.as_str())
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(&payload.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_email)?;
        let account = Account::try_from(row)?;

        match account.role {
            Role::Employer => {
                sqlx::query(
                    r#"
                    INSERT INTO employers (user_id, company_name, company_type, address, latitude, longitude)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(account.id)
                .bind(company_name)
                .bind(&payload.company_type)
                .bind(&payload.address)
                .bind(payload.latitude)
                .bind(payload.longitude)
                .execute(&mut *tx)
                .await?;
            }
            Role::Jobseeker => {
                sqlx::query(
                    r#"
                    INSERT INTO jobseekers (user_id, skills, preferred_field, address, latitude, longitude)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(account.id)
                .bind(normalize_skills(&payload.skills))
                .bind(&payload.preferred_field)
                .bind(&payload.address)
                .bind(payload.latitude)
                .bind(payload.longitude)
                .execute(&mut *tx)
                .await?;
            }
            Role::Admin => return Err(Error::Forbidden),
        }

        tx.commit().await?;
        tracing::info!(user_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    pub async fn get(&self, id: Uuid) -> Result<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Account not found".into()))?;
        Account::try_from(row)
    }

    pub async fn employer_profile(&self, user_id: Uuid) -> Result<Option<EmployerProfile>> {
        let profile = sqlx::query_as::<_, EmployerProfile>(&format!(
            "SELECT {} FROM employers WHERE user_id = $1",
            EMPLOYER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn jobseeker_profile(&self, user_id: Uuid) -> Result<Option<JobseekerProfile>> {
        let profile = sqlx::query_as::<_, JobseekerProfile>(&format!(
            "SELECT {} FROM jobseekers WHERE user_id = $1",
            JOBSEEKER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn profile(&self, account: &Account) -> Result<Option<RoleProfile>> {
        Ok(match account.role {
            Role::Employer => self.employer_profile(account.id).await?.map(RoleProfile::Employer),
            Role::Jobseeker => self
                .jobseeker_profile(account.id)
                .await?
                .map(RoleProfile::Jobseeker),
            Role::Admin => None,
        })
    }

    pub async fn detail(&self, id: Uuid) -> Result<AccountDetailResponse> {
        let account = self.get(id).await?;
        let profile = self.profile(&account).await?;
        let documents = match &profile {
            Some(RoleProfile::Employer(p)) => {
                ProfileDocuments::from_columns(p.photo_path.clone(), p.valid_id_path.clone())
            }
            Some(RoleProfile::Jobseeker(p)) => {
                ProfileDocuments::from_columns(p.photo_path.clone(), p.valid_id_path.clone())
            }
            None => ProfileDocuments::default(),
        };
        Ok(AccountDetailResponse {
            account,
            profile,
            documents,
        })
    }

    /// Non-admin accounts for the back-office, newest first.
    pub async fn list(&self, query: AccountListQuery) -> Result<AccountListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let (where_clause, args) = account_filters(&query);

        let items_query = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            ACCOUNT_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM users {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, AccountRow>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let rows = items_statement
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let items = rows
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(AccountListResponse {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Every account matching the filters, for the spreadsheet export.
    pub async fn list_all(&self, query: &AccountListQuery) -> Result<Vec<Account>> {
        let (where_clause, args) = account_filters(query);
        let sql = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC",
            ACCOUNT_COLUMNS, where_clause
        );
        let mut statement = sqlx::query_as::<_, AccountRow>(&sql);
        for value in &args {
            statement = statement.bind(value);
        }
        statement
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let by_status = sqlx::query_as::<_, (String, String, i64)>(
            r#"
            SELECT status, role, COUNT(*)
            FROM users
            WHERE role <> 'admin'
            GROUP BY status, role
            ORDER BY status, role
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(status, role, count)| StatusCount { status, role, count })
        .collect::<Vec<_>>();

        let total_accounts = by_status.iter().map(|c| c.count).sum();
        let pending_review = by_status
            .iter()
            .filter(|c| c.status == AccountStatus::UnderReview.as_str())
            .map(|c| c.count)
            .sum();

        let active_jobs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        let unread_contact_messages: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE status = 'unread'")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            total_accounts,
            pending_review,
            active_jobs,
            unread_contact_messages,
            by_status,
        })
    }

    /// Active jobseekers with coordinates, for the employer candidates map.
    pub async fn candidate_locations(&self) -> Result<Vec<(Account, JobseekerProfile)>> {
        let user_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT u.id
            FROM users u
            JOIN jobseekers js ON js.user_id = u.id
            WHERE u.status = 'active' AND js.latitude IS NOT NULL AND js.longitude IS NOT NULL
            ORDER BY u.created_at DESC
            LIMIT 500
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            let account = self.get(id).await?;
            if let Some(profile) = self.jobseeker_profile(id).await? {
                out.push((account, profile));
            }
        }
        Ok(out)
    }
}

fn account_filters(query: &AccountListQuery) -> (String, Vec<String>) {
    let mut filters = vec!["role <> 'admin'".to_string()];
    let mut args: Vec<String> = Vec::new();

    if let Some(status) = query.status {
        args.push(status.as_str().to_string());
        filters.push(format!("status = ${}", args.len()));
    }
    if let Some(role) = query.role {
        args.push(role.as_str().to_string());
        filters.push(format!("role = ${}", args.len()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        args.push(format!("%{}%", search));
        let n = args.len();
        filters.push(format!(
            "(email ILIKE ${n} OR first_name ILIKE ${n} OR last_name ILIKE ${n})"
        ));
    }

    (format!("WHERE {}", filters.join(" AND ")), args)
}

fn unique_email(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            Error::Conflict("Email is already registered".into())
        }
        _ => Error::from(err),
    }
}
