//! Top-level facade crate for udpmetrics.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use udpmetrics_core::*;
}

pub mod gateway {
    pub use udpmetrics_gateway::*;
}
