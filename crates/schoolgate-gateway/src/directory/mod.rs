//! Role and entitlement resolution.
//!
//! Every protected request re-resolves against the [`RoleSource`]; nothing is
//! cached, so entitlement changes apply on the next request. Call volume is
//! bounded by the rate limiter, which runs first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use schoolgate_core::error::{GateError, Result};
use schoolgate_core::{Identity, Principal, RoleRecord, TenantMapping};

/// Authoritative role/entitlement lookup. Returns at most one record per user.
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn lookup_role(&self, user_id: &str) -> Result<Option<RoleRecord>>;

    /// Raw user -> tenant mapping rows (schema plus per-schema role label).
    async fn tenant_mappings(&self, user_id: &str) -> Result<Vec<TenantMapping>>;
}

pub struct RoleDirectory {
    source: Arc<dyn RoleSource>,
    timeout: Duration,
}

impl RoleDirectory {
    pub fn new(source: Arc<dyn RoleSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Build the request principal.
    ///
    /// Errors:
    /// - `RoleUndefined`: no record, lookup error, or lookup timeout.
    /// - `RoleInvalid`: record carries a role outside the enumerated set.
    pub async fn resolve(&self, identity: Identity) -> Result<Principal> {
        let user_id = identity.user_id.clone();
        let record = match tokio::time::timeout(self.timeout, self.source.lookup_role(&user_id)).await {
            Ok(Ok(Some(record))) => record,
            Ok(Ok(None)) => {
                tracing::warn!(%user_id, "user has no role record");
                return Err(GateError::RoleUndefined);
            }
            Ok(Err(e)) => {
                tracing::error!(%user_id, error = %e, "role lookup failed");
                return Err(GateError::RoleUndefined);
            }
            Err(_) => {
                tracing::warn!(%user_id, timeout_ms = self.timeout.as_millis() as u64, "role lookup timed out");
                return Err(GateError::RoleUndefined);
            }
        };

        Principal::from_record(identity, record)
    }

    pub async fn tenant_mappings(&self, user_id: &str) -> Result<Vec<TenantMapping>> {
        tokio::time::timeout(self.timeout, self.source.tenant_mappings(user_id))
            .await
            .map_err(|_| GateError::UpstreamQuery("tenant mapping lookup timed out".into()))?
    }
}
