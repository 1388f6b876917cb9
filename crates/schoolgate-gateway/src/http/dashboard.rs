//! Dashboard query actions.
//!
//! Each action requires the principal attached by the gateway and reads only
//! through the schema-scoped query policy.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app_state::AppState;
use crate::http::error::ApiError;
use crate::http::extract::RequirePrincipal;
use crate::query::{AlertRow, Alerts, EventRow, Events, QueryPayload, Summary, SummaryRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemasResponse {
    pub user_id: String,
    pub schemas: Vec<String>,
    pub roles: Vec<String>,
}

/// Schemas the caller can read and their per-schema role labels.
///
/// `schemas` is the entitlement the data actions filter by. Tenant mapping
/// rows only contribute `roles`, and rows for schemas outside the entitlement
/// are ignored so the two lists never disagree.
pub async fn schemas(
    State(app): State<AppState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<Json<SchemasResponse>, ApiError> {
    let rows = app.directory().tenant_mappings(&principal.id).await?;
    let entitlement = &principal.entitlement;
    let roles = rows
        .into_iter()
        .filter(|r| entitlement.contains(&r.schema_name))
        .filter_map(|r| r.role.filter(|role| !role.is_empty()))
        .collect();
    let schemas = entitlement.names().into_iter().map(String::from).collect();

    Ok(Json(SchemasResponse {
        user_id: principal.id,
        schemas,
        roles,
    }))
}

pub async fn summary(
    State(app): State<AppState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<Json<QueryPayload<SummaryRow>>, ApiError> {
    Ok(Json(app.queries().run::<Summary>(&principal.entitlement).await?))
}

pub async fn events(
    State(app): State<AppState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<Json<QueryPayload<EventRow>>, ApiError> {
    Ok(Json(app.queries().run::<Events>(&principal.entitlement).await?))
}

pub async fn alerts(
    State(app): State<AppState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<Json<QueryPayload<AlertRow>>, ApiError> {
    Ok(Json(app.queries().run::<Alerts>(&principal.entitlement).await?))
}
