//! Command-line flags.
//!
//! Flags override the optional YAML config; anything left unset falls back to
//! the file, then to built-in defaults.

use clap::Parser;

use udpmetrics_core::error::Result;

use crate::config::{self, BridgeConfig};

#[derive(Debug, Parser)]
#[command(name = "udp-to-metrics", about = "Apply JSON metric updates received over UDP and expose them for scraping")]
pub struct Args {
    /// YAML service config.
    #[arg(long)]
    pub config: Option<String>,

    /// HTTP port used to read metrics [default: 8080]
    #[arg(long)]
    pub http_port: Option<u16>,

    /// UDP port used to receive messages [default: 9090]
    #[arg(long)]
    pub udp_port: Option<u16>,

    /// Default metric namespace [default: utm]
    #[arg(long)]
    pub default_namespace: Option<String>,

    /// Default metric subsystem [default: app]
    #[arg(long)]
    pub default_subsystem: Option<String>,

    /// Metric definitions, a JSON file.
    #[arg(long)]
    pub metrics_file: Option<String>,
}

impl Args {
    /// Merge flags over the config file (if any) and validate the result.
    pub fn into_config(self) -> Result<BridgeConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::parse_file(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(port) = self.http_port {
            cfg.exposition.listen = with_port(&cfg.exposition.listen, port);
        }
        if let Some(port) = self.udp_port {
            cfg.receiver.listen = with_port(&cfg.receiver.listen, port);
        }
        if let Some(ns) = self.default_namespace {
            cfg.defaults.namespace = ns;
        }
        if let Some(sub) = self.default_subsystem {
            cfg.defaults.subsystem = sub;
        }
        if let Some(path) = self.metrics_file {
            cfg.metrics_file = path;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Replace the port of a listen address, keeping its host. Unparseable
/// addresses fall back to all interfaces.
fn with_port(listen: &str, port: u16) -> String {
    match listen.parse::<std::net::SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{port}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn flags_without_file_use_defaults() {
        let args = Args::try_parse_from(["udp-to-metrics", "--metrics-file", "m.json"]).unwrap();
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.receiver.listen, "0.0.0.0:9090");
        assert_eq!(cfg.exposition.listen, "0.0.0.0:8080");
        assert_eq!(cfg.defaults.namespace, "utm");
        assert_eq!(cfg.defaults.subsystem, "app");
    }

    #[test]
    fn flags_override_ports_and_defaults() {
        let args = Args::try_parse_from([
            "udp-to-metrics",
            "--metrics-file",
            "m.json",
            "--udp-port",
            "9999",
            "--http-port",
            "9100",
            "--default-namespace",
            "shop",
        ])
        .unwrap();
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.receiver.listen, "0.0.0.0:9999");
        assert_eq!(cfg.exposition.listen, "0.0.0.0:9100");
        assert_eq!(cfg.defaults.namespace, "shop");
        assert_eq!(cfg.defaults.subsystem, "app");
    }

    #[test]
    fn metrics_file_is_required() {
        let args = Args::try_parse_from(["udp-to-metrics"]).unwrap();
        let err = args.into_config().unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }

    #[test]
    fn port_swap_keeps_host() {
        assert_eq!(with_port("127.0.0.1:9090", 1), "127.0.0.1:1");
        assert_eq!(with_port("[::1]:9090", 7), "[::1]:7");
    }
}
