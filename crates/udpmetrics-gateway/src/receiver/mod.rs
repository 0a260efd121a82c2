//! UDP receiver.
//!
//! Responsibilities:
//! - Own the inbound datagram socket
//! - Decode one JSON message per datagram
//! - Route by full metric name and apply the update
//! - Count every rejected datagram under exactly one `receive_errors{error}`
//!
//! Datagrams are handled one at a time, in arrival order. Nothing that goes
//! wrong with a single datagram ends the loop; only cancellation does.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;

use udpmetrics_core::error::{ReceiveError, Result};
use udpmetrics_core::protocol::message::{decode, MAX_DATAGRAM_BYTES};

use crate::obs::{CounterVec, MetricStore};
use crate::registry::MetricRegistry;

/// Result of handling one datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Rejected(ReceiveError),
}

/// Meta-metrics describing the receiver itself.
#[derive(Debug, Clone)]
pub struct ReceiverMetrics {
    receive_errors: CounterVec,
    handled: CounterVec,
}

impl ReceiverMetrics {
    /// Register `<ns>_<sub>_receive_errors{error}` and `<ns>_<sub>_handled{metric}`.
    pub fn register(store: &MetricStore, namespace: &str, subsystem: &str) -> Result<Self> {
        let receive_errors = store.counter_vec(
            &format!("{namespace}_{subsystem}_receive_errors"),
            "receive errors",
            &["error".to_string()],
        )?;
        let handled = match store.counter_vec(
            &format!("{namespace}_{subsystem}_handled"),
            "handled messages",
            &["metric".to_string()],
        ) {
            Ok(h) => h,
            Err(e) => {
                store.unregister(&format!("{namespace}_{subsystem}_receive_errors"));
                return Err(e);
            }
        };
        Ok(Self {
            receive_errors,
            handled,
        })
    }

    fn error(&self, kind: ReceiveError) {
        if let Err(e) = self.receive_errors.inc(&[kind.as_str()]) {
            tracing::warn!(error = %e, "failed to count receive error");
        }
    }

    fn handled(&self, metric: &str) {
        if let Err(e) = self.handled.inc(&[metric]) {
            tracing::warn!(error = %e, "failed to count handled message");
        }
    }

    pub fn errors(&self, kind: ReceiveError) -> f64 {
        self.receive_errors.get(&[kind.as_str()]).unwrap_or(0.0)
    }

    pub fn handled_count(&self, metric: &str) -> f64 {
        self.handled.get(&[metric]).unwrap_or(0.0)
    }
}

pub struct Receiver {
    registry: Arc<MetricRegistry>,
    metrics: ReceiverMetrics,
}

impl Receiver {
    /// Registers the meta-metrics; failing that is fatal.
    pub fn new(
        registry: Arc<MetricRegistry>,
        store: &MetricStore,
        namespace: &str,
        subsystem: &str,
    ) -> Result<Self> {
        let metrics = ReceiverMetrics::register(store, namespace, subsystem)?;
        Ok(Self { registry, metrics })
    }

    pub fn metrics(&self) -> &ReceiverMetrics {
        &self.metrics
    }

    /// Handle one datagram payload.
    pub fn handle_datagram(&self, bytes: &[u8]) -> Outcome {
        let msg = match decode(bytes) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(error = %e, bytes = bytes.len(), "dropping undecodable datagram");
                return self.reject(ReceiveError::JsonUnmarshal);
            }
        };

        if msg.name.is_empty() {
            return self.reject(ReceiveError::EmptyName);
        }

        let Some(metric) = self.registry.lookup(&msg.name) else {
            tracing::debug!(metric = %msg.name, "unknown metric");
            return self.reject(ReceiveError::MetricNotFound);
        };

        self.metrics.handled(&msg.name);

        if let Err(e) = metric.handle(&msg) {
            tracing::debug!(metric = %msg.name, code = e.code(), error = %e, "update rejected");
            return self.reject(ReceiveError::MetricHandle);
        }
        Outcome::Handled
    }

    fn reject(&self, kind: ReceiveError) -> Outcome {
        self.metrics.error(kind);
        Outcome::Rejected(kind)
    }

    /// Bind `listen` and run until cancelled.
    pub async fn serve(self, listen: SocketAddr, cancel: watch::Receiver<bool>) -> Result<()> {
        let socket = UdpSocket::bind(listen).await?;
        self.run(socket, cancel).await
    }

    /// Receive loop on an already bound socket.
    ///
    /// Cancellation is checked before every read and also raced against the
    /// pending read, so an idle socket does not delay shutdown. The socket is
    /// dropped (closed) on return.
    pub async fn run(self, socket: UdpSocket, mut cancel: watch::Receiver<bool>) -> Result<()> {
        let local = socket.local_addr()?;
        tracing::info!(%local, total_metrics = self.registry.len(), "receiver started");

        let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];
        loop {
            if *cancel.borrow() {
                break;
            }

            let read = tokio::select! {
                r = socket.recv_from(&mut buf) => r,
                changed = cancel.changed() => {
                    // A dropped sender can never cancel; treat it as shutdown.
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            match read {
                Ok((n, _peer)) => {
                    self.handle_datagram(&buf[..n]);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "socket read failed");
                    self.metrics.error(ReceiveError::SocketRead);
                }
            }
        }

        tracing::info!("receiver exited");
        Ok(())
    }
}
