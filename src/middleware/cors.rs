use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use url::Url;

/// CORS for the web portal. Falls back to any origin when the portal URL
/// has no usable origin (local development).
pub fn portal_cors(portal_base_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let origin = Url::parse(portal_base_url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
        .filter(|o| o != "null")
        .and_then(|o| HeaderValue::from_str(&o).ok());

    match origin {
        Some(origin) => layer.allow_origin(origin),
        None => {
            tracing::warn!(portal_base_url, "portal origin not usable, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}
