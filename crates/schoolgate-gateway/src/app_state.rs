//! Shared application state for the schoolgate gateway.
//!
//! Built once at startup from validated config plus the backend
//! collaborators; cloned cheaply into every handler.

use std::sync::Arc;
use std::time::Duration;

use schoolgate_core::error::Result;

use crate::config::GatewayConfig;
use crate::directory::RoleDirectory;
use crate::gateway::AuthorizationGateway;
use crate::identity::IdentityResolver;
use crate::infra::Backends;
use crate::obs::GatewayMetrics;
use crate::policy::{FixedWindowLimiter, PermissionMatrix, RouteClassifier};
use crate::query::SchemaScopedQueryPolicy;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    gateway: AuthorizationGateway,
    directory: Arc<RoleDirectory>,
    queries: SchemaScopedQueryPolicy,
    limiter: Arc<FixedWindowLimiter>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state. Re-validates the config so hand-built
    /// configs (tests, embedding) get the same fail-fast checks as files.
    pub fn new(cfg: GatewayConfig, backends: Backends) -> Result<Self> {
        cfg.validate()?;

        let lookup_timeout = Duration::from_millis(cfg.lookups.timeout_ms);
        let metrics = Arc::new(GatewayMetrics::default());

        let limiter = Arc::new(FixedWindowLimiter::new(
            Duration::from_secs(cfg.rate_limit.window_secs),
            cfg.rate_limit.max_requests,
        ));
        let directory = Arc::new(RoleDirectory::new(backends.roles, lookup_timeout));
        let identity = IdentityResolver::new(
            backends.identity,
            cfg.session.cookies.clone(),
            lookup_timeout,
        );

        let gateway = AuthorizationGateway::new(
            RouteClassifier::new(&cfg.routes.public, &cfg.routes.protected),
            PermissionMatrix::new(&cfg.roles),
            Arc::clone(&limiter),
            identity,
            Arc::clone(&directory),
            cfg.routes.login_path.clone(),
        );
        let queries = SchemaScopedQueryPolicy::new(backends.data, Arc::clone(&metrics));

        tracing::info!(
            window_secs = cfg.rate_limit.window_secs,
            max_requests = cfg.rate_limit.max_requests,
            lookup_timeout_ms = cfg.lookups.timeout_ms,
            "gateway state initialized"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                gateway,
                directory,
                queries,
                limiter,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn gateway(&self) -> &AuthorizationGateway {
        &self.inner.gateway
    }

    pub fn directory(&self) -> &RoleDirectory {
        &self.inner.directory
    }

    pub fn queries(&self) -> &SchemaScopedQueryPolicy {
        &self.inner.queries
    }

    pub fn limiter(&self) -> Arc<FixedWindowLimiter> {
        Arc::clone(&self.inner.limiter)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![(
            "schoolgate_rate_limit_tracked_principals",
            self.inner.limiter.tracked() as u64,
        )]
    }
}
