//! Declared row shapes for each dataset.
//!
//! Rows are validated by deserializing into the typed structs below; columns
//! not declared by a shape are dropped, nullable columns accept null or absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::query::relation::Relation;
use crate::query::source::TenantRow;

/// A logical dataset served by the query policy.
pub trait Dataset {
    type Row: DeserializeOwned + Serialize + Send;

    /// Label used in logs and metrics.
    const NAME: &'static str;

    /// Primary relation (consolidated view where one exists).
    const PRIMARY: Relation;

    /// Secondary source used when the primary returns zero rows.
    fn fallback() -> Option<Fallback> {
        None
    }
}

/// Lower-level source plus the mapping into the dataset's canonical shape.
#[derive(Clone, Copy)]
pub struct Fallback {
    pub relation: Relation,
    pub map: fn(TenantRow) -> TenantRow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub schema_name: String,
    pub total_eventos: Option<Number>,
    pub eventos_24h: Option<Number>,
    pub eventos_1h: Option<Number>,
    pub eventos_pendentes: Option<Number>,
    pub notif_falhas: Option<Number>,
    pub evento_mais_antigo: Option<String>,
    pub evento_mais_recente: Option<String>,
    pub dias_agregados: Option<Number>,
    pub total_movimentacoes: Option<Number>,
    pub ultima_agregacao: Option<String>,
    pub media_diaria: Option<Number>,
    pub eventos_arquivados: Option<Number>,
    pub arquivo_mais_antigo: Option<String>,
    pub arquivo_mais_recente: Option<String>,
    pub tamanho_eventos: Option<Number>,
    pub tamanho_diario: Option<Number>,
    pub tamanho_arquivo: Option<Number>,
    pub health_status: Option<String>,
    pub alerta: Option<String>,
    pub taxa_processamento: Option<Number>,
    pub taxa_notificacao: Option<Number>,
}

/// Summary columns the raw event table also carries.
pub const SUMMARY_RAW_FIELDS: [&str; 11] = [
    "total_eventos",
    "eventos_24h",
    "eventos_1h",
    "eventos_pendentes",
    "notif_falhas",
    "evento_mais_antigo",
    "evento_mais_recente",
    "dias_agregados",
    "total_movimentacoes",
    "ultima_agregacao",
    "health_status",
];

/// Summary columns only the consolidated view has; null after fallback.
pub const SUMMARY_VIEW_ONLY_FIELDS: [&str; 10] = [
    "media_diaria",
    "eventos_arquivados",
    "arquivo_mais_antigo",
    "arquivo_mais_recente",
    "tamanho_eventos",
    "tamanho_diario",
    "tamanho_arquivo",
    "alerta",
    "taxa_processamento",
    "taxa_notificacao",
];

/// Map a raw event row into the summary shape.
pub fn summary_from_event(mut raw: TenantRow) -> TenantRow {
    let mut out = Map::new();
    out.insert(
        "schema_name".into(),
        raw.remove("schema_name").unwrap_or(Value::Null),
    );
    for field in SUMMARY_RAW_FIELDS {
        out.insert(field.into(), raw.remove(field).unwrap_or(Value::Null));
    }
    for field in SUMMARY_VIEW_ONLY_FIELDS {
        out.insert(field.into(), Value::Null);
    }
    out
}

/// Raw access event; every column besides `schema_name` is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub schema_name: String,
    #[serde(flatten)]
    pub columns: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRow {
    pub schema_name: String,
    pub total_alerts: Option<Number>,
    pub latest_alert: Option<String>,
}

pub struct Summary;

impl Dataset for Summary {
    type Row = SummaryRow;
    const NAME: &'static str = "summary";
    const PRIMARY: Relation = Relation::DashboardConsolidado;

    fn fallback() -> Option<Fallback> {
        Some(Fallback {
            relation: Relation::EventosAcessoDashboard,
            map: summary_from_event,
        })
    }
}

pub struct Events;

impl Dataset for Events {
    type Row = EventRow;
    const NAME: &'static str = "events";
    const PRIMARY: Relation = Relation::EventosAcessoDashboard;
}

pub struct Alerts;

impl Dataset for Alerts {
    type Row = AlertRow;
    const NAME: &'static str = "alerts";
    const PRIMARY: Relation = Relation::HealthAlertsMonitor;
}
