//! Shared error type across schoolgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// No valid session.
    Unauthenticated,
    /// Per-principal request quota exhausted.
    RateLimited,
    /// Authenticated, but the role directory has no record.
    RoleUndefined,
    /// Role directory returned a role outside the enumerated set.
    RoleInvalid,
    /// Role is valid but not permitted on this route.
    RouteForbidden,
    /// Backend data query failed.
    UpstreamQuery,
    /// Backend rows did not match the declared shape.
    ShapeValidation,
    /// Invalid input or configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Unauthenticated => "UNAUTHENTICATED",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::RoleUndefined => "ROLE_UNDEFINED",
            ClientCode::RoleInvalid => "ROLE_INVALID",
            ClientCode::RouteForbidden => "ROUTE_FORBIDDEN",
            ClientCode::UpstreamQuery => "UPSTREAM_QUERY",
            ClientCode::ShapeValidation => "SHAPE_VALIDATION",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GateError>;

/// Unified error type used by core and gateway.
///
/// The first five variants are authorization-stage outcomes: terminal and
/// never retried. Query errors carry their cause for diagnostics.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("rate limit exceeded, retry after the current window")]
    RateLimited,
    #[error("user has no role defined")]
    RoleUndefined,
    #[error("role not authorized for dashboard: {0}")]
    RoleInvalid(String),
    #[error("role {role} is not permitted to access {path}")]
    RouteForbidden { role: String, path: String },
    #[error("upstream query failed: {0}")]
    UpstreamQuery(String),
    #[error("invalid response shape: {0}")]
    ShapeValidation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GateError::Unauthenticated => ClientCode::Unauthenticated,
            GateError::RateLimited => ClientCode::RateLimited,
            GateError::RoleUndefined => ClientCode::RoleUndefined,
            GateError::RoleInvalid(_) => ClientCode::RoleInvalid,
            GateError::RouteForbidden { .. } => ClientCode::RouteForbidden,
            GateError::UpstreamQuery(_) => ClientCode::UpstreamQuery,
            GateError::ShapeValidation(_) => ClientCode::ShapeValidation,
            GateError::BadRequest(_) => ClientCode::BadRequest,
            GateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            GateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether this error was produced by the authorization pipeline.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            GateError::Unauthenticated
                | GateError::RateLimited
                | GateError::RoleUndefined
                | GateError::RoleInvalid(_)
                | GateError::RouteForbidden { .. }
        )
    }
}
