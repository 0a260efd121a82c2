//! udpmetrics core: transport-agnostic wire formats and the error surface.
//!
//! This crate defines the inbound message and metric definition contracts
//! shared by the gateway and by tooling. It carries no socket or runtime
//! dependencies so it can be reused by senders as well.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `BridgeError`/`Result`; a malformed
//! datagram is an error value, never a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ReceiveError, Result};
