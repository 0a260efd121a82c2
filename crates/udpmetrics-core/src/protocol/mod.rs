//! Wire formats.
//!
//! - `message`: inbound update datagrams (JSON object per datagram).
//! - `definition`: declared metrics (JSON array, loaded once at startup).
//!
//! Decoders are panic-free: malformed input is reported as `BridgeError`
//! so one bad datagram never takes the receiver down.

use serde::{Deserialize, Deserializer};

pub mod definition;
pub mod message;

pub use definition::{MetricDefinition, MetricType};
pub use message::{Command, Message};

/// Treat an explicit JSON `null` like an absent field.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
