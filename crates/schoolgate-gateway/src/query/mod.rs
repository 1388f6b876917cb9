//! Tenant-scoped data retrieval.
//!
//! Every read goes through [`SchemaScopedQueryPolicy`], which applies the
//! principal's entitlement as a mandatory `schema_name` filter and composes
//! the summary dataset from raw events when the consolidated view is empty.

pub mod policy;
pub mod relation;
pub mod shape;
pub mod source;

pub use policy::{QueryPayload, SchemaScopedQueryPolicy};
pub use relation::{Relation, TenantQuery};
pub use shape::{AlertRow, Alerts, Dataset, EventRow, Events, Fallback, Summary, SummaryRow};
pub use source::{TenantDataSource, TenantRow};
