//! Top-level facade crate for schoolgate.
//!
//! Re-exports the domain types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use schoolgate_core::*;
}

pub mod gateway {
    pub use schoolgate_gateway::*;
}
