use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::job::{Job, JobStatus};

fn validate_salary_range(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    match (payload.salary_min, payload.salary_max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_salary_range"))]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub field: String,
    #[validate(length(min = 1, max = 50))]
    pub job_type: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub field: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub job_type: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct JobStatusPayload {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub search: Option<String>,
    pub field: Option<String>,
    pub job_type: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobListResponse {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// A point on the map with free-form properties.
#[derive(Debug, Clone)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub properties: JsonValue,
}

/// GeoJSON `FeatureCollection`. Coordinates are `[longitude, latitude]`.
pub fn feature_collection(points: Vec<MapPoint>) -> JsonValue {
    let features: Vec<JsonValue> = points
        .into_iter()
        .map(|p| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [p.longitude, p.latitude] },
                "properties": p.properties,
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}
