use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationStatusPayload, ApplyPayload},
    error::Result,
    models::{account::Role, session::Session},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Application),
        (status = 403, description = "Not an active jobseeker"),
        (status = 404, description = "Job not found or closed"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Jobseeker)?;
    payload.validate()?;
    let application = state
        .applications
        .apply(session.user_id, job_id, payload.cover_letter)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/jobseeker/applications",
    responses(
        (status = 200, description = "Own applications, newest first", body = [Application]),
        (status = 403, description = "Not a jobseeker")
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    session.require_role(Role::Jobseeker)?;
    Ok(Json(
        state.applications.list_for_jobseeker(session.user_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/employer/jobs/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applications to the job", body = [Application]),
        (status = 403, description = "Not the employer who posted the job")
    )
)]
#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    session.require_role(Role::Employer)?;
    Ok(Json(
        state.applications.list_for_job(session.user_id, job_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ApplicationStatusPayload,
    responses(
        (status = 200, description = "Status changed and logged", body = Application),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Not the employer who posted the job"),
        (status = 409, description = "Status changed concurrently")
    )
)]
#[axum::debug_handler]
pub async fn set_application_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Employer)?;
    let application = state
        .applications
        .set_status(session.user_id, id, payload.status)
        .await?;
    Ok(Json(application))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/events",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Status history, oldest first", body = [ApplicationEvent]),
        (status = 403, description = "Neither the applicant nor the employer")
    )
)]
#[axum::debug_handler]
pub async fn application_events(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.applications.events(session.user_id, id).await?))
}
