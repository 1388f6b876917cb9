//! schoolgate core: transport-agnostic domain types and the shared error surface.
//!
//! This crate defines roles, tenant schema identifiers, entitlements and the
//! resolved principal that the gateway hands to downstream handlers. It carries
//! no HTTP or runtime dependencies so the same types serve the gateway, the
//! backends and tests.
//!
//! # Guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Fallible paths
//! surface as `GateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{ClientCode, GateError, Result};
pub use model::{Entitlement, Identity, Principal, Role, RoleRecord, SchemaName, TenantMapping};
