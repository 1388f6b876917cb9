#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::*;
use schoolgate_core::{Entitlement, GateError, Result, TenantMapping};
use schoolgate_gateway::infra::MemoryBackend;
use schoolgate_gateway::obs::GatewayMetrics;
use schoolgate_gateway::query::shape::{SUMMARY_RAW_FIELDS, SUMMARY_VIEW_ONLY_FIELDS};
use schoolgate_gateway::query::{
    Alerts, Events, Relation, SchemaScopedQueryPolicy, Summary, TenantDataSource, TenantQuery,
    TenantRow,
};

fn policy(backend: &Arc<MemoryBackend>) -> SchemaScopedQueryPolicy {
    SchemaScopedQueryPolicy::new(backend.clone(), Arc::new(GatewayMetrics::default()))
}

fn escola_1() -> Entitlement {
    Entitlement::from_raw([ESCOLA_1])
}

fn raw_event(schema: &str, total: u64) -> TenantRow {
    row(json!({
        "schema_name": schema,
        "total_eventos": total,
        "eventos_24h": 4,
        "eventos_1h": 1,
        "eventos_pendentes": 0,
        "notif_falhas": 0,
        "evento_mais_antigo": "2024-03-01T08:00:00Z",
        "evento_mais_recente": "2024-03-20T14:30:00Z",
        "health_status": "OK",
        "tipo_evento": "entrada",
    }))
}

#[tokio::test]
async fn empty_entitlement_issues_no_backend_query() {
    let backend = seeded_backend();
    backend.insert_rows(Relation::EventosAcessoDashboard, vec![raw_event(ESCOLA_1, 1)]);
    let p = policy(&backend);
    let none = Entitlement::empty();

    let events = p.run::<Events>(&none).await.unwrap();
    assert_eq!((events.duration_ms, events.rows, events.data.len()), (0.0, 0, 0));
    let summary = p.run::<Summary>(&none).await.unwrap();
    assert_eq!(summary.rows, 0);
    let alerts = p.run::<Alerts>(&none).await.unwrap();
    assert_eq!(alerts.rows, 0);

    assert_eq!(backend.fetch_count(), 0);
}

#[tokio::test]
async fn summary_falls_back_to_raw_events() {
    let backend = seeded_backend();
    backend.insert_rows(
        Relation::EventosAcessoDashboard,
        vec![
            raw_event(ESCOLA_1, 10),
            raw_event(ESCOLA_1, 20),
            raw_event(ESCOLA_1, 30),
            raw_event(ESCOLA_2, 99),
        ],
    );
    let metrics = Arc::new(GatewayMetrics::default());
    let p = SchemaScopedQueryPolicy::new(backend.clone(), Arc::clone(&metrics));

    let out = p.run::<Summary>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 3);
    assert_eq!(out.data.len(), 3);
    assert_eq!(backend.fetch_count(), 2);
    assert_eq!(metrics.query_fallbacks.get(&[("dataset", "summary")]), 1);

    let json = serde_json::to_value(&out).unwrap();
    for r in json["data"].as_array().unwrap() {
        assert_eq!(r["schema_name"], ESCOLA_1);
        assert_eq!(r["eventos_24h"], 4);
        assert_eq!(r["health_status"], "OK");
        // Present in the summary shape but absent from the raw rows.
        assert_eq!(r["dias_agregados"], Value::Null);
        for field in SUMMARY_VIEW_ONLY_FIELDS {
            assert_eq!(r[field], Value::Null, "{field}");
        }
        for field in SUMMARY_RAW_FIELDS {
            assert!(r.get(field).is_some(), "{field} must be present");
        }
        assert!(r.get("tipo_evento").is_none());
    }
}

#[tokio::test]
async fn consolidated_rows_skip_fallback() {
    let backend = seeded_backend();
    backend.insert_rows(
        Relation::DashboardConsolidado,
        vec![row(json!({
            "schema_name": ESCOLA_1,
            "total_eventos": 120,
            "media_diaria": 12.5,
            "alerta": null,
        }))],
    );
    backend.insert_rows(Relation::EventosAcessoDashboard, vec![raw_event(ESCOLA_1, 1)]);

    let out = policy(&backend).run::<Summary>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 1);
    assert_eq!(out.data[0].media_diaria.as_ref().and_then(|n| n.as_f64()), Some(12.5));
    assert_eq!(backend.fetch_count(), 1);
}

#[tokio::test]
async fn datasets_without_fallback_return_empty() {
    let backend = seeded_backend();
    let p = policy(&backend);

    let out = p.run::<Events>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 0);
    let out = p.run::<Alerts>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 0);
    assert_eq!(backend.fetch_count(), 2);
}

#[tokio::test]
async fn primary_error_fails_without_fallback() {
    let backend = seeded_backend();
    backend.fail_relation(Relation::DashboardConsolidado, "relation does not exist");
    backend.insert_rows(Relation::EventosAcessoDashboard, vec![raw_event(ESCOLA_1, 1)]);

    match policy(&backend).run::<Summary>(&escola_1()).await {
        Err(GateError::UpstreamQuery(cause)) => assert!(cause.contains("relation does not exist")),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(backend.fetch_count(), 1);
}

#[tokio::test]
async fn fallback_error_is_upstream_error() {
    let backend = seeded_backend();
    backend.fail_relation(Relation::EventosAcessoDashboard, "timeout");

    let err = policy(&backend).run::<Summary>(&escola_1()).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "UPSTREAM_QUERY");
}

#[tokio::test]
async fn malformed_rows_are_shape_errors() {
    let backend = seeded_backend();
    backend.insert_rows(
        Relation::HealthAlertsMonitor,
        vec![row(json!({ "schema_name": ESCOLA_1, "total_alerts": "many" }))],
    );

    match policy(&backend).run::<Alerts>(&escola_1()).await {
        Err(GateError::ShapeValidation(detail)) => assert!(detail.starts_with("row 0")),
        other => panic!("unexpected: {other:?}"),
    }
}

/// Ignores the filter and records which relations were read, in order.
#[derive(Default)]
struct LeakySource {
    rows: Vec<TenantRow>,
    calls: Mutex<Vec<Relation>>,
}

#[async_trait]
impl TenantDataSource for LeakySource {
    async fn fetch(&self, query: &TenantQuery) -> Result<Vec<TenantRow>> {
        self.calls.lock().unwrap().push(query.relation());
        if query.relation() == Relation::DashboardConsolidado {
            return Ok(Vec::new());
        }
        Ok(self.rows.clone())
    }
}

#[tokio::test]
async fn rows_outside_entitlement_never_leave_the_policy() {
    let source = Arc::new(LeakySource {
        rows: vec![raw_event(ESCOLA_1, 1), raw_event(ESCOLA_2, 2), raw_event("escola_99999999", 3)],
        ..Default::default()
    });
    let p = SchemaScopedQueryPolicy::new(source.clone(), Arc::new(GatewayMetrics::default()));

    let out = p.run::<Events>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 1);
    assert!(out.data.iter().all(|r| r.schema_name == ESCOLA_1));

    let out = p.run::<Summary>(&escola_1()).await.unwrap();
    assert_eq!(out.rows, 1);

    // Fallback strictly after an empty primary.
    assert_eq!(
        *source.calls.lock().unwrap(),
        vec![
            Relation::EventosAcessoDashboard,
            Relation::DashboardConsolidado,
            Relation::EventosAcessoDashboard,
        ]
    );
}

#[tokio::test]
async fn http_events_with_empty_entitlement() {
    let backend = seeded_backend();
    let resp = send(&app(&backend), get("/api/v1/dashboard/events", Some(NO_SCHEMAS))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_security_headers(resp.headers());

    let body = body_json(resp).await;
    assert_eq!(body["durationMs"].as_f64(), Some(0.0));
    assert_eq!(body["rows"], 0);
    assert_eq!(body["data"], json!([]));
    assert_eq!(backend.fetch_count(), 0);
}

#[tokio::test]
async fn http_summary_composes_from_fallback() {
    let backend = seeded_backend();
    backend.insert_rows(
        Relation::EventosAcessoDashboard,
        vec![raw_event(ESCOLA_1, 5), raw_event(ESCOLA_1, 6)],
    );

    let resp = send(&app(&backend), get("/api/v1/dashboard/summary", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["rows"], 2);
    assert!(body["durationMs"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["data"][0]["taxa_notificacao"], Value::Null);
}

#[tokio::test]
async fn http_upstream_error_is_400_with_cause() {
    let backend = seeded_backend();
    backend.fail_relation(Relation::EventosAcessoDashboard, "connection refused");

    let resp = send(&app(&backend), get("/api/v1/dashboard/events", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_security_headers(resp.headers());
    let body = body_json(resp).await;
    assert_eq!(body["code"], "UPSTREAM_QUERY");
    assert!(body["cause"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn http_shape_error_is_400_with_detail() {
    let backend = seeded_backend();
    backend.insert_rows(
        Relation::HealthAlertsMonitor,
        vec![row(json!({ "schema_name": ESCOLA_2, "latest_alert": 42 }))],
    );

    let resp = send(&app(&backend), get("/api/v1/dashboard/alerts", Some(SEGURANCA))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "SHAPE_VALIDATION");
    assert!(body["cause"].is_string());
}

#[tokio::test]
async fn http_schemas_lists_tenant_mappings() {
    let backend = seeded_backend();
    let resp = send(&app(&backend), get("/api/v1/dashboard/schemas", Some(DIRETORIA))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(
        body,
        json!({ "userId": "u-dir", "schemas": [ESCOLA_1], "roles": ["DIRETORIA"] })
    );
}

#[tokio::test]
async fn http_schemas_follow_the_entitlement() {
    let backend = seeded_backend();
    backend.insert_mappings(
        "u-dir",
        vec![
            TenantMapping {
                schema_name: ESCOLA_1.into(),
                role: Some("DIRETORIA".into()),
            },
            TenantMapping {
                schema_name: ESCOLA_2.into(),
                role: Some("SEC_SEG_PUB".into()),
            },
        ],
    );
    let app = app(&backend);

    let body = body_json(send(&app, get("/api/v1/dashboard/schemas", Some(DIRETORIA))).await).await;
    assert_eq!(body["schemas"], json!([ESCOLA_1]));
    assert_eq!(body["roles"], json!(["DIRETORIA"]));

    // No mapping rows: schemas still list what the data actions will read.
    let body = body_json(send(&app, get("/api/v1/dashboard/schemas", Some(SEGURANCA))).await).await;
    assert_eq!(body["userId"], "u-seg");
    assert_eq!(body["schemas"], json!([ESCOLA_1, ESCOLA_2]));
    assert_eq!(body["roles"], json!([]));
}
