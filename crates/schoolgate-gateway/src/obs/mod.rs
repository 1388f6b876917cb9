//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics in DashMap-backed label vectors and rendered
//! in Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::GatewayMetrics;
