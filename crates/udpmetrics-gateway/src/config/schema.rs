use std::net::SocketAddr;

use serde::Deserialize;
use udpmetrics_core::error::{BridgeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub receiver: ReceiverSection,

    #[serde(default)]
    pub exposition: ExpositionSection,

    #[serde(default)]
    pub defaults: DefaultsSection,

    #[serde(default)]
    pub metrics_file: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            receiver: ReceiverSection::default(),
            exposition: ExpositionSection::default(),
            defaults: DefaultsSection::default(),
            metrics_file: String::new(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BridgeError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.metrics_file.is_empty() {
            return Err(BridgeError::Config(
                "metrics file is not specified, use --metrics-file".into(),
            ));
        }

        self.receiver_addr()?;
        self.exposition_addr()?;
        self.defaults.validate()?;

        Ok(())
    }

    pub fn receiver_addr(&self) -> Result<SocketAddr> {
        parse_listen("receiver.listen", &self.receiver.listen)
    }

    pub fn exposition_addr(&self) -> Result<SocketAddr> {
        parse_listen("exposition.listen", &self.exposition.listen)
    }
}

fn parse_listen(field: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| BridgeError::Config(format!("{field} must be a valid socket address: {e}")))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverSection {
    #[serde(default = "default_receiver_listen")]
    pub listen: String,
}

impl Default for ReceiverSection {
    fn default() -> Self {
        Self {
            listen: default_receiver_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpositionSection {
    #[serde(default = "default_exposition_listen")]
    pub listen: String,
}

impl Default for ExpositionSection {
    fn default() -> Self {
        Self {
            listen: default_exposition_listen(),
        }
    }
}

/// Namespace/subsystem used for definitions that leave them empty, and for
/// the receiver's own metrics.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_subsystem")]
    pub subsystem: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
        }
    }
}

impl DefaultsSection {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(BridgeError::Config("defaults.namespace must not be empty".into()));
        }
        if self.subsystem.is_empty() {
            return Err(BridgeError::Config("defaults.subsystem must not be empty".into()));
        }
        Ok(())
    }
}

fn default_receiver_listen() -> String {
    "0.0.0.0:9090".into()
}
fn default_exposition_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_namespace() -> String {
    "utm".into()
}
fn default_subsystem() -> String {
    "app".into()
}
