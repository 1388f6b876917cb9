//! Backend collaborators: identity provider, role source, tenant data.

pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use schoolgate_core::error::{GateError, Result};

use crate::config::BackendConfig;
use crate::directory::RoleSource;
use crate::identity::IdentityProvider;
use crate::query::TenantDataSource;

pub use memory::{Fixtures, MemoryBackend};
pub use postgrest::PostgrestBackend;

/// The three external seams the gateway depends on.
#[derive(Clone)]
pub struct Backends {
    pub identity: Arc<dyn IdentityProvider>,
    pub roles: Arc<dyn RoleSource>,
    pub data: Arc<dyn TenantDataSource>,
}

impl Backends {
    /// One object serving all three seams.
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: IdentityProvider + RoleSource + TenantDataSource + 'static,
    {
        Self {
            identity: backend.clone(),
            roles: backend.clone(),
            data: backend,
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        match cfg {
            BackendConfig::Memory { fixtures } => {
                let backend = match fixtures {
                    Some(path) => MemoryBackend::from_fixtures_file(path)?,
                    None => MemoryBackend::new(),
                };
                tracing::info!(fixtures = ?fixtures, "using in-memory backend");
                Ok(Self::shared(Arc::new(backend)))
            }
            BackendConfig::Postgrest { url, api_key_env } => {
                let key = std::env::var(api_key_env).map_err(|_| {
                    GateError::BadRequest(format!("backend api key env {api_key_env} is not set"))
                })?;
                tracing::info!(%url, "using postgrest backend");
                Ok(Self::shared(Arc::new(PostgrestBackend::new(url, key)?)))
            }
        }
    }
}
