pub mod account;
pub mod admin;
pub mod applications;
pub mod auth;
pub mod contact;
pub mod docs;
pub mod export;
pub mod health;
pub mod jobs;
pub mod matches;
pub mod messages;
pub mod notifications;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    auth::{require_admin, require_session},
    cors::portal_cors,
    rate_limit::{rps_middleware, RateLimiter, TrustedProxies},
};
use crate::services::document_storage::MAX_DOCUMENT_BYTES;
use crate::AppState;

/// The full HTTP surface of the service.
pub fn router(state: AppState, config: &Config) -> Router {
    let proxies = TrustedProxies::new(config.trusted_proxies.clone());
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/map", get(jobs::jobs_map))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/contact", post(contact::submit_contact))
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps, proxies.clone()),
            rps_middleware,
        ));

    let user_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/account/documents",
            post(account::upload_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 64 * 1024)),
        )
        .route("/api/account/request-approval", post(account::request_approval))
        .route(
            "/api/employer/jobs",
            get(jobs::list_own_jobs).post(jobs::create_job),
        )
        .route("/api/employer/jobs/:id", patch(jobs::update_job))
        .route("/api/employer/jobs/:id/status", post(jobs::set_job_status))
        .route(
            "/api/employer/jobs/:id/applications",
            get(applications::job_applications),
        )
        .route("/api/employer/candidates/map", get(jobs::candidates_map))
        .route("/api/jobs/:id/apply", post(applications::apply))
        .route(
            "/api/applications/:id/status",
            post(applications::set_application_status),
        )
        .route(
            "/api/applications/:id/events",
            get(applications::application_events),
        )
        .route(
            "/api/jobseeker/applications",
            get(applications::my_applications),
        )
        .route("/api/jobseeker/matches", get(matches::job_matches))
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread", get(notifications::unread_count))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route("/api/messages", post(messages::send_message))
        .route("/api/messages/unread", get(messages::unread_count))
        .route("/api/messages/:user_id", get(messages::conversation))
        .route_layer(from_fn_with_state(state.clone(), require_session))
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps, proxies.clone()),
            rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/accounts", get(admin::list_accounts))
        .route("/api/admin/accounts/export", get(export::export_accounts))
        .route("/api/admin/accounts/:id", get(admin::account_detail))
        .route("/api/admin/accounts/:id/actions", post(admin::apply_action))
        .route(
            "/api/admin/contact-messages",
            get(admin::list_contact_messages),
        )
        .route(
            "/api/admin/contact-messages/:id/read",
            post(admin::mark_contact_message_read),
        )
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_session))
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps, proxies.clone()),
            rps_middleware,
        ));

    tracing::info!(uploads_dir = %config.uploads_dir, "serving uploads to admins");

    public_api
        .merge(user_api)
        .merge(admin_api)
        .with_state(state)
        .layer(portal_cors(&config.portal_base_url))
        .layer(TraceLayer::new_for_http())
}
