use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::Error;
use crate::models::account::Role;
use crate::models::session::Session;
use crate::AppState;

fn bearer_token(req: &Request) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".into()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".into()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))
}

/// Resolves the bearer token into a [`Session`] request extension. The
/// account row is re-read so suspensions apply immediately.
pub async fn require_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };
    match state.auth.authenticate(&token).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Must run after [`require_session`].
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<Session>() {
        Some(session) if session.role == Role::Admin => next.run(req).await,
        Some(_) => Error::Forbidden.into_response(),
        None => Error::Unauthorized("missing_authorization".into()).into_response(),
    }
}
