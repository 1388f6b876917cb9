//! HTTP surface: error mapping, principal extractor, query actions, ops.

pub mod dashboard;
pub mod error;
pub mod extract;
pub mod ops;

pub use error::ApiError;
pub use extract::RequirePrincipal;
