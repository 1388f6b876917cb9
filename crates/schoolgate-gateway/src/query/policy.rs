use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use schoolgate_core::error::{GateError, Result};
use schoolgate_core::Entitlement;

use crate::obs::metrics::GatewayMetrics;
use crate::query::relation::{Relation, TenantQuery};
use crate::query::shape::Dataset;
use crate::query::source::{TenantDataSource, TenantRow};

/// Response payload for every query action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload<R> {
    /// Fetch time only (primary plus fallback), in milliseconds.
    pub duration_ms: f64,
    pub rows: usize,
    pub data: Vec<R>,
}

impl<R> QueryPayload<R> {
    pub fn empty() -> Self {
        Self {
            duration_ms: 0.0,
            rows: 0,
            data: Vec::new(),
        }
    }
}

/// Applies an entitlement to every tenant-data read.
///
/// Primary and fallback reads are strictly sequential: the fallback is only
/// issued after the primary has returned zero rows.
pub struct SchemaScopedQueryPolicy {
    source: Arc<dyn TenantDataSource>,
    metrics: Arc<GatewayMetrics>,
}

impl SchemaScopedQueryPolicy {
    pub fn new(source: Arc<dyn TenantDataSource>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { source, metrics }
    }

    pub async fn run<D: Dataset>(&self, entitlement: &Entitlement) -> Result<QueryPayload<D::Row>> {
        if entitlement.is_empty() {
            return Ok(QueryPayload::empty());
        }

        let started = Instant::now();
        let mut raw = self.fetch_scoped(D::NAME, D::PRIMARY, entitlement).await?;

        if raw.is_empty() {
            if let Some(fallback) = D::fallback() {
                tracing::debug!(
                    dataset = D::NAME,
                    primary = %D::PRIMARY,
                    fallback = %fallback.relation,
                    "primary view empty, composing from fallback"
                );
                raw = self
                    .fetch_scoped(D::NAME, fallback.relation, entitlement)
                    .await?
                    .into_iter()
                    .map(fallback.map)
                    .collect();
                self.metrics.query_fallbacks.inc(&[("dataset", D::NAME)]);
            }
        }
        let elapsed = started.elapsed();
        self.metrics
            .query_duration
            .observe(&[("dataset", D::NAME)], elapsed);

        let data = validate_rows::<D::Row>(raw).map_err(|e| {
            self.metrics
                .query_errors
                .inc(&[("dataset", D::NAME), ("kind", e.client_code().as_str())]);
            e
        })?;

        Ok(QueryPayload {
            duration_ms: round_ms(elapsed),
            rows: data.len(),
            data,
        })
    }

    /// Fetch one relation filtered to the entitlement.
    ///
    /// Rows outside the entitlement are discarded even if the backend
    /// returned them.
    async fn fetch_scoped(
        &self,
        dataset: &'static str,
        relation: Relation,
        entitlement: &Entitlement,
    ) -> Result<Vec<TenantRow>> {
        let Some(query) = TenantQuery::scoped(relation, entitlement) else {
            return Ok(Vec::new());
        };

        let mut rows = self.source.fetch(&query).await.map_err(|e| {
            let e = match e {
                GateError::UpstreamQuery(_) => e,
                other => GateError::UpstreamQuery(other.to_string()),
            };
            tracing::error!(dataset, %relation, error = %e, "tenant query failed");
            self.metrics
                .query_errors
                .inc(&[("dataset", dataset), ("kind", e.client_code().as_str())]);
            e
        })?;

        let before = rows.len();
        rows.retain(|row| query.matches(row));
        if rows.len() != before {
            tracing::warn!(
                %relation,
                dropped = before - rows.len(),
                "backend returned rows outside the entitlement"
            );
        }
        Ok(rows)
    }
}

fn validate_rows<R: serde::de::DeserializeOwned>(rows: Vec<TenantRow>) -> Result<Vec<R>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value::<R>(Value::Object(row))
                .map_err(|e| GateError::ShapeValidation(format!("row {i}: {e}")))
        })
        .collect()
}

fn round_ms(d: Duration) -> f64 {
    (d.as_secs_f64() * 100_000.0).round() / 100.0
}
