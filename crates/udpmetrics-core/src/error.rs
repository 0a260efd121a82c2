//! Shared error type across udpmetrics crates.

use thiserror::Error;

/// Categories counted by the receiver's `receive_errors{error}` meta-metric.
///
/// Every rejected datagram lands in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiveError {
    /// Reading from the socket failed.
    SocketRead,
    /// The datagram is not a valid JSON message.
    JsonUnmarshal,
    /// The message carries no target name.
    EmptyName,
    /// No registered metric has the target name.
    MetricNotFound,
    /// The target metric rejected the update.
    MetricHandle,
}

impl ReceiveError {
    /// Label value used in the `error` dimension.
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiveError::SocketRead => "socket_read_error",
            ReceiveError::JsonUnmarshal => "json_unmarshal_error",
            ReceiveError::EmptyName => "empty_name",
            ReceiveError::MetricNotFound => "metric_not_found",
            ReceiveError::MetricHandle => "metric_handle_error",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("unsupported metric type: {0:?}")]
    UnsupportedMetricType(String),
    #[error("unsupported command: {0:?}")]
    UnsupportedCommand(String),
    #[error("label arity mismatch for {metric}: expected {expected}, got {got}")]
    LabelArityMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("registration failed: {0}")]
    Registration(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(String),
}

impl BridgeError {
    /// Stable code for logs and operator-facing output.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::DuplicateMetric(_) => "DUPLICATE_METRIC",
            BridgeError::UnsupportedMetricType(_) => "UNSUPPORTED_METRIC_TYPE",
            BridgeError::UnsupportedCommand(_) => "UNSUPPORTED_COMMAND",
            BridgeError::LabelArityMismatch { .. } => "LABEL_ARITY_MISMATCH",
            BridgeError::Registration(_) => "REGISTRATION",
            BridgeError::InvalidValue(_) => "INVALID_VALUE",
            BridgeError::Decode(_) => "DECODE",
            BridgeError::Config(_) => "CONFIG",
            BridgeError::Io(_) => "IO",
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::Io(e.to_string())
    }
}
