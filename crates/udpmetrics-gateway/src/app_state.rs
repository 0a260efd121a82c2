//! Shared application state.
//!
//! Owns the metric store and the registry built from the loaded definitions.
//! Handed to the HTTP router and used to construct the receiver; there is no
//! process-global metrics state.

use std::sync::Arc;

use udpmetrics_core::error::Result;
use udpmetrics_core::protocol::MetricDefinition;

use crate::config::BridgeConfig;
use crate::obs::MetricStore;
use crate::receiver::Receiver;
use crate::registry::MetricRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BridgeConfig,
    store: Arc<MetricStore>,
    registry: Arc<MetricRegistry>,
}

impl AppState {
    /// Build the registry from `definitions`.
    /// Returns Result so main can report bad definitions instead of panicking.
    pub fn new(cfg: BridgeConfig, definitions: Vec<MetricDefinition>) -> Result<Self> {
        let store = Arc::new(MetricStore::new());
        let registry = MetricRegistry::build(
            definitions,
            &cfg.defaults.namespace,
            &cfg.defaults.subsystem,
            &store,
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                registry: Arc::new(registry),
            }),
        })
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<MetricStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.registry)
    }

    /// Create the receiver, registering its meta-metrics in the shared store.
    pub fn receiver(&self) -> Result<Receiver> {
        let d = &self.inner.cfg.defaults;
        Receiver::new(self.registry(), &self.inner.store, &d.namespace, &d.subsystem)
    }
}
