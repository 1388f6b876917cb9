//! Axum router wiring.
//!
//! Every route (and the 404 fallback) sits behind the authorization gateway.

use axum::{middleware, routing::get, Router};

use crate::app_state::AppState;
use crate::gateway;
use crate::http::{dashboard, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/dashboard/schemas", get(dashboard::schemas))
        .route("/api/v1/dashboard/summary", get(dashboard::summary))
        .route("/api/v1/dashboard/events", get(dashboard::events))
        .route("/api/v1/dashboard/alerts", get(dashboard::alerts))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(middleware::from_fn_with_state(state.clone(), gateway::authorize))
        .with_state(state)
}
