//! udpmetrics gateway library entry.
//!
//! This crate wires the metric store, the registry of declared metrics, the
//! UDP receiver and the HTTP exposition endpoint into one service. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod obs;
pub mod ops;
pub mod receiver;
pub mod registry;
pub mod router;
