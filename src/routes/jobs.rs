use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        feature_collection, CreateJobPayload, JobListQuery, JobStatusPayload,
        MapPoint, UpdateJobPayload,
    },
    error::Result,
    models::{account::Role, session::Session},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("search" = Option<String>, Query, description = "Title, description or location contains"),
        ("field" = Option<String>, Query, description = "Job field"),
        ("job_type" = Option<String>, Query, description = "Job type"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses((status = 200, description = "Active jobs", body = JobListResponse))
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.jobs.list_public(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = Job),
        (status = 404, description = "Job not found or not active")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.jobs.get_public(id).await?))
}

/// GeoJSON of active jobs for the map view.
#[axum::debug_handler]
pub async fn jobs_map(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let points = state.jobs.map_points().await?;
    Ok(Json(feature_collection(points)))
}

#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Employer)?;
    payload.validate()?;
    let job = state.jobs.create(session.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[axum::debug_handler]
pub async fn list_own_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    session.require_role(Role::Employer)?;
    Ok(Json(state.jobs.list_own(session.user_id).await?))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Employer)?;
    payload.validate()?;
    Ok(Json(state.jobs.update(session.user_id, id, payload).await?))
}

#[axum::debug_handler]
pub async fn set_job_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobStatusPayload>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Employer)?;
    Ok(Json(
        state.jobs.set_status(session.user_id, id, payload.status).await?,
    ))
}

/// GeoJSON of active job seekers, for active employers.
#[axum::debug_handler]
pub async fn candidates_map(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Employer)?;
    let points = state
        .accounts
        .candidate_locations()
        .await?
        .into_iter()
        .filter_map(|(account, profile)| {
            Some(MapPoint {
                latitude: profile.latitude?,
                longitude: profile.longitude?,
                properties: json!({
                    "id": account.id,
                    "name": account.full_name(),
                    "skills": profile.skills,
                    "preferred_field": profile.preferred_field,
                }),
            })
        })
        .collect();
    Ok(Json(feature_collection(points)))
}
