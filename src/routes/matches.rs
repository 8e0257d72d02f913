use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::message_dto::LimitQuery,
    error::{Error, Result},
    models::{account::Role, session::Session},
    services::match_service,
    AppState,
};

/// Active jobs ranked by match score for the signed-in job seeker.
#[axum::debug_handler]
pub async fn job_matches(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    session.require_active_role(Role::Jobseeker)?;
    let profile = state
        .accounts
        .jobseeker_profile(session.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Job seeker profile not found".into()))?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100) as usize;
    let jobs = state.jobs.list_active(500).await?;
    Ok(Json(match_service::rank(jobs, &profile, limit)))
}
