use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::application::ApplicationStatus;
use crate::models::job::Job;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplyPayload {
    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplicationStatusPayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobMatch {
    pub job: Job,
    /// 0 to 100.
    pub score: u8,
    pub distance_km: Option<f64>,
}
