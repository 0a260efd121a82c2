//! Service config (strict YAML) and metric definition loading (JSON).

pub mod schema;

use std::fs;

use udpmetrics_core::error::{BridgeError, Result};
use udpmetrics_core::protocol::definition::{decode_definitions, MetricDefinition};

pub use schema::{BridgeConfig, DefaultsSection, ExpositionSection, ReceiverSection};

/// Load and validate a YAML service config.
pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Read and parse a YAML service config without validating it.
pub fn parse_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}

/// Parse a YAML service config without validating it; command-line
/// overrides are merged before validation.
pub fn parse_str(s: &str) -> Result<BridgeConfig> {
    serde_yaml::from_str(s).map_err(|e| BridgeError::Config(format!("invalid yaml: {e}")))
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load the metric definitions file (JSON array).
pub fn load_definitions_from_file(path: &str) -> Result<Vec<MetricDefinition>> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read metrics file {path} failed: {e}")))?;
    load_definitions_from_str(&s)
}

pub fn load_definitions_from_str(s: &str) -> Result<Vec<MetricDefinition>> {
    let defs = decode_definitions(s)?;
    if let Some(i) = defs.iter().position(|d| d.name.is_empty()) {
        return Err(BridgeError::Config(format!(
            "metric definition #{i} has an empty name"
        )));
    }
    Ok(defs)
}
