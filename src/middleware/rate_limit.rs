use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

/// Resolved address of the caller, attached to every rate-limited request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub Option<IpAddr>);

/// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` headers are believed.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<[IpAddr]>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(proxies.into())
    }

    /// The peer address, unless the peer is a trusted proxy that names the
    /// original client. Headers from anyone else are ignored.
    pub fn resolve(&self, peer: Option<IpAddr>, headers: &HeaderMap) -> Option<IpAddr> {
        match peer {
            Some(ip) if self.0.contains(&ip) => forwarded_for(headers).or(Some(ip)),
            other => other,
        }
    }
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    used: u32,
}

#[derive(Debug)]
struct Windows {
    by_client: HashMap<Option<IpAddr>, Window>,
    pruned_at: Instant,
}

/// Fixed one-second window per client address. Requests without a known
/// address share a single bucket. Expired windows are dropped at most once
/// per window.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    proxies: TrustedProxies,
    windows: Arc<Mutex<Windows>>,
}

impl RateLimiter {
    pub fn new(rps: u32, proxies: TrustedProxies) -> Self {
        Self {
            rps: rps.max(1),
            proxies,
            windows: Arc::new(Mutex::new(Windows {
                by_client: HashMap::new(),
                pruned_at: Instant::now(),
            })),
        }
    }

    fn allow_at(&self, client: Option<IpAddr>, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        if now.duration_since(windows.pruned_at) >= WINDOW {
            windows
                .by_client
                .retain(|_, w| now.duration_since(w.opened) < WINDOW);
            windows.pruned_at = now;
        }

        let window = windows
            .by_client
            .entry(client)
            .or_insert(Window { opened: now, used: 0 });
        if now.duration_since(window.opened) >= WINDOW {
            *window = Window { opened: now, used: 0 };
        }
        if window.used >= self.rps {
            return false;
        }
        window.used += 1;
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.by_client.len())
            .unwrap_or_default()
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = limiter.proxies.resolve(peer, req.headers());

    if !limiter.allow_at(client, Instant::now()) {
        tracing::debug!(path = %req.uri().path(), client = ?client, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            Json(json!({ "success": false, "error": "rate_limit_exceeded" })),
        )
            .into_response();
    }
    req.extensions_mut().insert(ClientAddr(client));
    next.run(req).await
}
