//! Metric registry: full metric name -> live instance.
//!
//! Built once at startup from the loaded definitions and then shared
//! read-only with the receiver. A failed build leaves nothing behind in the
//! store.

pub mod instance;

use std::collections::HashMap;

use udpmetrics_core::error::{BridgeError, Result};
use udpmetrics_core::protocol::MetricDefinition;

use crate::obs::MetricStore;

pub use instance::{MetricInstance, MetricKind};

#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, MetricInstance>,
}

impl MetricRegistry {
    /// Register every definition, in order, filling empty namespace and
    /// subsystem from the defaults.
    ///
    /// Stops at the first failure and unregisters whatever this call had
    /// already added to `store`.
    pub fn build(
        definitions: Vec<MetricDefinition>,
        default_namespace: &str,
        default_subsystem: &str,
        store: &MetricStore,
    ) -> Result<Self> {
        let mut registry = Self::default();
        for def in definitions {
            let def = def.with_defaults(default_namespace, default_subsystem);
            if let Err(e) = registry.insert(&def, store) {
                for name in registry.metrics.keys() {
                    store.unregister(name);
                }
                return Err(e);
            }
        }
        Ok(registry)
    }

    fn insert(&mut self, def: &MetricDefinition, store: &MetricStore) -> Result<()> {
        let name = def.full_name();
        if self.metrics.contains_key(&name) {
            return Err(BridgeError::DuplicateMetric(name));
        }
        let instance = MetricInstance::register(def, store)?;
        tracing::info!(metric = %name, kind = instance.metric_type().as_str(), labels = def.labels.len(), "registered metric");
        self.metrics.insert(name, instance);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&MetricInstance> {
        self.metrics.get(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metrics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
