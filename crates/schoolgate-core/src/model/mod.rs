//! Domain model shared by the gateway and its backends.
//!
//! - [`Role`]: enumerated principal categories.
//! - [`SchemaName`] / [`Entitlement`]: validated tenant partitions a principal may read.
//! - [`Identity`] / [`Principal`]: an authenticated subject before and after role resolution.

pub mod principal;
pub mod role;
pub mod schema;

pub use principal::{Identity, Principal, RoleRecord, TenantMapping};
pub use role::Role;
pub use schema::{Entitlement, SchemaName};
