//! Authorization gateway (edge middleware).
//!
//! Pipeline for one request:
//!
//! ```text
//! classify ── public ──────────────────────────────────────────► Public
//!    └─ protected ─ identity ── none ─────────────────────────► Unauthenticated (401 / redirect)
//!                      └─ rate limit ── exceeded ─────────────► RateLimited (429)
//!                            └─ role directory ── no record ──► RoleUndefined (403 / redirect)
//!                                   ├─ unknown role ──────────► RoleInvalid (403)
//!                                   └─ permission matrix ─ no ► Forbidden (403)
//!                                                         └ yes► Authorized
//! ```
//!
//! Each stage waits for the previous one; the rate limit runs before the role
//! lookup so an over-quota principal never reaches the directory. Security
//! headers are applied to every response regardless of outcome.

pub mod headers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;

use schoolgate_core::{GateError, Principal, Role};

use crate::directory::RoleDirectory;
use crate::identity::IdentityResolver;
use crate::policy::{FixedWindowLimiter, PermissionMatrix, RateDecision, RouteClass, RouteClassifier};

pub use middleware::authorize;

/// Terminal state of the authorization pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Public,
    Unauthenticated,
    RateLimited { retry_after: Duration },
    RoleUndefined,
    RoleInvalid { role: String },
    Forbidden { role: Role, path: String },
    Authorized(Principal),
}

impl Decision {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Public => "public",
            Decision::Unauthenticated => "unauthenticated",
            Decision::RateLimited { .. } => "rate_limited",
            Decision::RoleUndefined => "role_undefined",
            Decision::RoleInvalid { .. } => "role_invalid",
            Decision::Forbidden { .. } => "forbidden",
            Decision::Authorized(_) => "authorized",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Public | Decision::Authorized(_))
    }

    /// Error for deny states, `None` for allow states.
    pub fn to_error(&self) -> Option<GateError> {
        match self {
            Decision::Public | Decision::Authorized(_) => None,
            Decision::Unauthenticated => Some(GateError::Unauthenticated),
            Decision::RateLimited { .. } => Some(GateError::RateLimited),
            Decision::RoleUndefined => Some(GateError::RoleUndefined),
            Decision::RoleInvalid { role } => Some(GateError::RoleInvalid(role.clone())),
            Decision::Forbidden { role, path } => Some(GateError::RouteForbidden {
                role: role.to_string(),
                path: path.clone(),
            }),
        }
    }
}

pub struct AuthorizationGateway {
    classifier: RouteClassifier,
    matrix: PermissionMatrix,
    limiter: Arc<FixedWindowLimiter>,
    identity: IdentityResolver,
    directory: Arc<RoleDirectory>,
    login_path: String,
}

impl AuthorizationGateway {
    pub fn new(
        classifier: RouteClassifier,
        matrix: PermissionMatrix,
        limiter: Arc<FixedWindowLimiter>,
        identity: IdentityResolver,
        directory: Arc<RoleDirectory>,
        login_path: String,
    ) -> Self {
        Self {
            classifier,
            matrix,
            limiter,
            identity,
            directory,
            login_path,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub async fn decide(&self, path: &str, headers: &HeaderMap) -> Decision {
        if self.classifier.classify(path) == RouteClass::Public {
            return Decision::Public;
        }

        let Some(identity) = self.identity.resolve(headers).await else {
            return Decision::Unauthenticated;
        };

        if let RateDecision::Limited { retry_after } = self.limiter.check(&identity.user_id) {
            return Decision::RateLimited { retry_after };
        }

        let principal = match self.directory.resolve(identity).await {
            Ok(p) => p,
            Err(GateError::RoleInvalid(role)) => return Decision::RoleInvalid { role },
            Err(_) => return Decision::RoleUndefined,
        };

        if !self.matrix.permitted(principal.role, path) {
            return Decision::Forbidden {
                role: principal.role,
                path: path.to_string(),
            };
        }

        Decision::Authorized(principal)
    }
}
