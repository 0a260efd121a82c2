//! Lightweight in-process metrics (no client library).
//!
//! The store is the only place metric values live. Declared metrics, the
//! receiver's own meta-metrics and the `/metrics` handler all go through it.

pub mod metrics;

pub use metrics::{Counter, CounterVec, Gauge, GaugeVec, MetricStore};
