//! Shared fixtures for gateway integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::COOKIE, HeaderMap, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use schoolgate_core::{Identity, RoleRecord, TenantMapping};
use schoolgate_gateway::{
    app_state::AppState,
    config::{self, GatewayConfig},
    gateway::headers::SECURITY_HEADERS,
    infra::{Backends, MemoryBackend},
    query::TenantRow,
    router,
};

pub const SESSION_COOKIE: &str = "sb-access-token";

pub const DIRETORIA: &str = "tok-diretoria";
pub const SEGURANCA: &str = "tok-seguranca";
pub const NO_ROLE: &str = "tok-no-role";
pub const BAD_ROLE: &str = "tok-bad-role";
pub const NO_SCHEMAS: &str = "tok-no-schemas";

pub const ESCOLA_1: &str = "escola_00000001";
pub const ESCOLA_2: &str = "escola_00000002";

pub fn config(extra: &str) -> GatewayConfig {
    config::load_from_str(&format!("version: 1\n{extra}")).expect("test config must load")
}

fn identity(id: &str, email: &str) -> Identity {
    Identity {
        user_id: id.into(),
        email: Some(email.into()),
    }
}

fn role(role_type: &str, schemas: &[&str]) -> RoleRecord {
    RoleRecord {
        role_type: role_type.into(),
        allowed_schemas: Some(schemas.iter().map(|s| s.to_string()).collect()),
    }
}

/// Backend with one user per interesting directory outcome.
pub fn seeded_backend() -> Arc<MemoryBackend> {
    let b = MemoryBackend::new();

    b.insert_session(DIRETORIA, identity("u-dir", "diretora@escola.br"));
    b.insert_session(SEGURANCA, identity("u-seg", "seg@estado.gov.br"));
    b.insert_session(NO_ROLE, identity("u-none", "none@escola.br"));
    b.insert_session(BAD_ROLE, identity("u-bad", "aluno@escola.br"));
    b.insert_session(NO_SCHEMAS, identity("u-empty", "mun@cidade.gov.br"));

    b.insert_role("u-dir", role("DIRETORIA", &[ESCOLA_1]));
    b.insert_role("u-seg", role("SEC_SEG_PUB", &[ESCOLA_1, ESCOLA_2]));
    b.insert_role("u-bad", role("ALUNO", &[ESCOLA_1]));
    b.insert_role("u-empty", role("SEC_EDUC_MUN", &[]));

    b.insert_mappings(
        "u-dir",
        vec![TenantMapping {
            schema_name: ESCOLA_1.into(),
            role: Some("DIRETORIA".into()),
        }],
    );

    Arc::new(b)
}

pub fn state(backend: &Arc<MemoryBackend>, cfg: GatewayConfig) -> AppState {
    AppState::new(cfg, Backends::shared(Arc::clone(backend))).expect("state must build")
}

pub fn app(backend: &Arc<MemoryBackend>) -> Router {
    router::build_router(state(backend, config("")))
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().uri(path);
    if let Some(t) = token {
        req = req.header(COOKIE, format!("theme=dark; {SESSION_COOKIE}={t}"));
    }
    req.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> Response {
    router.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn assert_security_headers(headers: &HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        assert_eq!(
            headers.get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "missing or wrong security header {name}"
        );
    }
}

pub fn row(v: Value) -> TenantRow {
    match v {
        Value::Object(m) => m,
        other => panic!("row must be an object, got {other}"),
    }
}
