//! schoolgate gateway library entry.
//!
//! Wires route classification, identity and role resolution, rate limiting
//! and the permission matrix into an authorization middleware, and serves the
//! tenant-scoped dashboard queries behind it. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod directory;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod infra;
pub mod obs;
pub mod policy;
pub mod query;
pub mod router;
