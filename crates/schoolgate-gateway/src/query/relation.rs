use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use schoolgate_core::{Entitlement, SchemaName};

use crate::query::source::TenantRow;

/// Backend relations this gateway reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Consolidated, pre-aggregated dashboard view.
    #[serde(rename = "dashboard_consolidado")]
    DashboardConsolidado,
    /// Raw per-event table.
    #[serde(rename = "eventos_acesso_dashboard")]
    EventosAcessoDashboard,
    /// Health alert monitor view.
    #[serde(rename = "v_health_alerts_monitor")]
    HealthAlertsMonitor,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::DashboardConsolidado => "dashboard_consolidado",
            Relation::EventosAcessoDashboard => "eventos_acesso_dashboard",
            Relation::HealthAlertsMonitor => "v_health_alerts_monitor",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read against one relation restricted to `schema_name IN (schemas)`.
///
/// Only constructible from a non-empty entitlement of validated
/// [`SchemaName`]s, so filters are never assembled from raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantQuery {
    relation: Relation,
    schemas: Vec<SchemaName>,
}

impl TenantQuery {
    /// `None` when the entitlement is empty: there is nothing to read.
    pub fn scoped(relation: Relation, entitlement: &Entitlement) -> Option<Self> {
        if entitlement.is_empty() {
            return None;
        }
        Some(Self {
            relation,
            schemas: entitlement.iter().cloned().collect(),
        })
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn schemas(&self) -> &[SchemaName] {
        &self.schemas
    }

    /// PostgREST filter value, e.g. `in.(escola_1,escola_2)`.
    pub fn in_filter(&self) -> String {
        let names: Vec<&str> = self.schemas.iter().map(SchemaName::as_str).collect();
        format!("in.({})", names.join(","))
    }

    /// Whether a row belongs to one of the queried schemas.
    pub fn matches(&self, row: &TenantRow) -> bool {
        match row.get("schema_name") {
            Some(Value::String(s)) => self.schemas.iter().any(|n| n.as_str() == s),
            _ => false,
        }
    }
}
