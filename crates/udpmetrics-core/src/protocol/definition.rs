//! Metric definitions as loaded from the definition source.

use serde::Deserialize;

use crate::error::{BridgeError, Result};
use crate::protocol::null_as_default;

/// Declared kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    /// Parse the definition spelling (`"counter"` / `"gauge"`).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            other => Err(BridgeError::UnsupportedMetricType(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
        }
    }
}

/// One declared metric.
///
/// `kind` stays a raw string so an unknown type survives loading and is
/// reported by the registry as `UnsupportedMetricType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subsystem: String,
    /// Field name is `type` in JSON.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Label names; order is significant.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub help: String,
}

impl MetricDefinition {
    /// Convenience constructor with empty namespace/subsystem/help.
    pub fn new(kind: &str, name: &str, labels: &[&str]) -> Self {
        Self {
            namespace: String::new(),
            subsystem: String::new(),
            kind: kind.to_string(),
            name: name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            help: String::new(),
        }
    }

    /// `namespace_subsystem_name`, the registry lookup key.
    pub fn full_name(&self) -> String {
        format!("{}_{}_{}", self.namespace, self.subsystem, self.name)
    }

    /// Fill empty namespace/subsystem from the given defaults.
    pub fn with_defaults(mut self, namespace: &str, subsystem: &str) -> Self {
        if self.namespace.is_empty() {
            self.namespace = namespace.to_string();
        }
        if self.subsystem.is_empty() {
            self.subsystem = subsystem.to_string();
        }
        self
    }

    pub fn metric_type(&self) -> Result<MetricType> {
        MetricType::parse(&self.kind)
    }
}

/// Decode a JSON array of definitions.
pub fn decode_definitions(s: &str) -> Result<Vec<MetricDefinition>> {
    serde_json::from_str(s).map_err(|e| BridgeError::Decode(format!("invalid definitions json: {e}")))
}
