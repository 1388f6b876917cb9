#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{header::LOCATION, StatusCode};
use axum::Router;

use common::*;
use schoolgate_core::{GateError, Identity, Result, RoleRecord, TenantMapping};
use schoolgate_gateway::app_state::AppState;
use schoolgate_gateway::directory::RoleSource;
use schoolgate_gateway::identity::IdentityProvider;
use schoolgate_gateway::infra::{Backends, MemoryBackend};
use schoolgate_gateway::router;

/// How a stubbed lookup behaves.
#[derive(Clone, Copy)]
enum Outcome {
    Ok,
    Fail,
    Hang,
}

async fn settle<T>(outcome: Outcome, ok: T) -> Result<T> {
    match outcome {
        Outcome::Ok => Ok(ok),
        Outcome::Fail => Err(GateError::UpstreamQuery("connection reset".into())),
        Outcome::Hang => std::future::pending().await,
    }
}

struct StubIdentity(Outcome);

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify_session(&self, _token: &str) -> Result<Option<Identity>> {
        let identity = Identity {
            user_id: "u-dir".into(),
            email: Some("diretora@escola.br".into()),
        };
        settle(self.0, Some(identity)).await
    }
}

struct StubRoles {
    lookup: Outcome,
    mappings: Outcome,
}

#[async_trait]
impl RoleSource for StubRoles {
    async fn lookup_role(&self, _user_id: &str) -> Result<Option<RoleRecord>> {
        let record = RoleRecord {
            role_type: "DIRETORIA".into(),
            allowed_schemas: Some(vec![ESCOLA_1.into()]),
        };
        settle(self.lookup, Some(record)).await
    }

    async fn tenant_mappings(&self, _user_id: &str) -> Result<Vec<TenantMapping>> {
        settle(self.mappings, Vec::new()).await
    }
}

/// Router with the fastest allowed lookup timeout. The memory backend serves
/// whichever seam is not stubbed.
fn app_with(identity: Option<StubIdentity>, roles: Option<StubRoles>) -> (Arc<MemoryBackend>, Router) {
    let memory = seeded_backend();
    let mut backends = Backends::shared(Arc::clone(&memory));
    if let Some(identity) = identity {
        backends.identity = Arc::new(identity);
    }
    if let Some(roles) = roles {
        backends.roles = Arc::new(roles);
    }
    let state = AppState::new(config("lookups:\n  timeout_ms: 100\n"), backends).unwrap();
    (memory, router::build_router(state))
}

#[tokio::test]
async fn hanging_identity_provider_is_unauthenticated() {
    let (memory, app) = app_with(Some(StubIdentity(Outcome::Hang)), None);

    let started = Instant::now();
    let resp = send(&app, get("/api/v1/dashboard/summary", Some(DIRETORIA))).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_security_headers(resp.headers());
    assert_eq!(body_json(resp).await["code"], "UNAUTHENTICATED");

    let resp = send(&app, get("/dashboard", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/login?error=unauthenticated");

    assert_eq!(memory.role_lookups(), 0);
}

#[tokio::test]
async fn failing_identity_provider_is_unauthenticated() {
    let (memory, app) = app_with(Some(StubIdentity(Outcome::Fail)), None);

    let resp = send(&app, get("/api/v1/dashboard/summary", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "UNAUTHENTICATED");
    assert_eq!(memory.role_lookups(), 0);
}

#[tokio::test]
async fn hanging_role_lookup_is_role_undefined() {
    let roles = StubRoles {
        lookup: Outcome::Hang,
        mappings: Outcome::Ok,
    };
    let (_, app) = app_with(None, Some(roles));

    let started = Instant::now();
    let resp = send(&app, get("/api/v1/dashboard/summary", Some(DIRETORIA))).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_security_headers(resp.headers());
    let body = body_json(resp).await;
    assert_eq!(body["code"], "ROLE_UNDEFINED");
    assert_eq!(body["redirect"], "/login");

    let resp = send(&app, get("/dashboard", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/login?error=role_undefined");
}

#[tokio::test]
async fn failing_role_lookup_is_role_undefined() {
    let roles = StubRoles {
        lookup: Outcome::Fail,
        mappings: Outcome::Ok,
    };
    let (_, app) = app_with(None, Some(roles));

    let resp = send(&app, get("/api/v1/dashboard/events", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["code"], "ROLE_UNDEFINED");
}

#[tokio::test]
async fn hanging_tenant_mappings_fail_the_schemas_action() {
    let roles = StubRoles {
        lookup: Outcome::Ok,
        mappings: Outcome::Hang,
    };
    let (_, app) = app_with(None, Some(roles));

    let resp = send(&app, get("/api/v1/dashboard/schemas", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "UPSTREAM_QUERY");
    assert!(body["cause"].as_str().unwrap().contains("timed out"));
}
