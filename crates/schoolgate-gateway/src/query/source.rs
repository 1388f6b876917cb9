use async_trait::async_trait;
use serde_json::{Map, Value};

use schoolgate_core::error::Result;

use crate::query::relation::TenantQuery;

/// One row from a tenant-scoped relation; always carries `schema_name`.
pub type TenantRow = Map<String, Value>;

/// Backend that executes [`TenantQuery`] reads.
#[async_trait]
pub trait TenantDataSource: Send + Sync {
    /// Failures must surface as `GateError::UpstreamQuery`.
    async fn fetch(&self, query: &TenantQuery) -> Result<Vec<TenantRow>>;
}
