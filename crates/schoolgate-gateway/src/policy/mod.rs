//! Policy layer (route classification, role permissions, rate limiting).
//!
//! Compiles the route and role configuration into lookup structures once at
//! startup; the gateway consults them on every request.

pub mod matrix;
pub mod rate_limit;
pub mod routes;

pub use matrix::PermissionMatrix;
pub use rate_limit::{FixedWindowLimiter, RateDecision};
pub use routes::{RouteClass, RouteClassifier};
