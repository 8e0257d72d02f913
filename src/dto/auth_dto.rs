use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::account::{Account, Role};

fn validate_signup_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::Admin => Err(ValidationError::new("role_not_allowed")),
        Role::Employer | Role::Jobseeker => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterPayload {
    #[validate(custom(function = "validate_signup_role"))]
    pub role: Role,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Required for employers.
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    pub company_type: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub preferred_field: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub account: Account,
    /// Where the portal should send the user next.
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentUploadResponse {
    pub success: bool,
    pub path: String,
}
