//! Operational endpoints. None of these paths is listed in the route config,
//! so the gateway lets them through unauthenticated.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app_state::AppState;

/// `/readyz` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub ready: bool,
    pub draining: bool,
    /// Configured backend kind (`memory` or `postgrest`).
    pub backend: &'static str,
    pub rate_limit_window_secs: u64,
    pub rate_limit_capacity: u32,
    pub tracked_principals: usize,
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// 200 while serving, 503 once shutdown has started.
pub async fn readyz(State(app): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let draining = app.is_draining();
    let limiter = app.limiter();
    let body = Readiness {
        ready: !draining,
        draining,
        backend: app.cfg().backend.kind(),
        rate_limit_window_secs: limiter.window().as_secs(),
        rate_limit_capacity: limiter.capacity(),
        tracked_principals: limiter.tracked(),
    };
    let status = if draining {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(body))
}

/// Prometheus text exposition.
pub async fn metrics(State(app): State<AppState>) -> Response {
    let body = app.metrics().render(&app.metrics_extra());
    ([(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")], body).into_response()
}
