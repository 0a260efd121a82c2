//! A declared metric bound to its store handle.

use udpmetrics_core::error::{BridgeError, Result};
use udpmetrics_core::protocol::{Command, Message, MetricDefinition, MetricType};

use crate::obs::{Counter, CounterVec, Gauge, GaugeVec, MetricStore};

/// Kind and shape of a live metric.
#[derive(Debug, Clone)]
pub enum MetricKind {
    ScalarCounter(Counter),
    VectorCounter(CounterVec),
    ScalarGauge(Gauge),
    VectorGauge(GaugeVec),
}

/// Live metric created from one definition.
#[derive(Debug, Clone)]
pub struct MetricInstance {
    name: String,
    labels: Vec<String>,
    kind: MetricKind,
}

impl MetricInstance {
    /// Register `def` in the store under its full name.
    ///
    /// `def` must already carry its effective namespace/subsystem.
    pub fn register(def: &MetricDefinition, store: &MetricStore) -> Result<Self> {
        let name = def.full_name();
        let kind = match (def.metric_type()?, def.labels.is_empty()) {
            (MetricType::Counter, true) => MetricKind::ScalarCounter(store.counter(&name, &def.help)?),
            (MetricType::Counter, false) => {
                MetricKind::VectorCounter(store.counter_vec(&name, &def.help, &def.labels)?)
            }
            (MetricType::Gauge, true) => MetricKind::ScalarGauge(store.gauge(&name, &def.help)?),
            (MetricType::Gauge, false) => {
                MetricKind::VectorGauge(store.gauge_vec(&name, &def.help, &def.labels)?)
            }
        };
        Ok(Self {
            name,
            labels: def.labels.clone(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }

    pub fn metric_type(&self) -> MetricType {
        match self.kind {
            MetricKind::ScalarCounter(_) | MetricKind::VectorCounter(_) => MetricType::Counter,
            MetricKind::ScalarGauge(_) | MetricKind::VectorGauge(_) => MetricType::Gauge,
        }
    }

    /// Resolve the message's command and apply it.
    pub fn handle(&self, msg: &Message) -> Result<()> {
        self.apply(msg.command()?, &msg.labels, msg.value)
    }

    /// Apply one update. `value` is only read for `Command::Add`.
    ///
    /// Label values must match the declared label names one-to-one; scalar
    /// metrics accept no label values at all.
    pub fn apply(&self, command: Command, label_values: &[String], value: f64) -> Result<()> {
        if label_values.len() != self.labels.len() {
            return Err(BridgeError::LabelArityMismatch {
                metric: self.name.clone(),
                expected: self.labels.len(),
                got: label_values.len(),
            });
        }

        match (&self.kind, command) {
            (MetricKind::ScalarCounter(c), Command::Increment) => c.inc(),
            (MetricKind::ScalarCounter(c), Command::Add) => c.add(value)?,
            (MetricKind::VectorCounter(c), Command::Increment) => c.inc(label_values)?,
            (MetricKind::VectorCounter(c), Command::Add) => c.add(label_values, value)?,
            (MetricKind::ScalarGauge(g), Command::Increment) => g.inc(),
            (MetricKind::ScalarGauge(g), Command::Add) => g.add(value),
            (MetricKind::VectorGauge(g), Command::Increment) => g.inc(label_values)?,
            (MetricKind::VectorGauge(g), Command::Add) => g.add(label_values, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use udpmetrics_core::protocol::message::decode;

    fn def(kind: &str, name: &str, labels: &[&str]) -> MetricDefinition {
        MetricDefinition::new(kind, name, labels).with_defaults("utm", "app")
    }

    fn vals(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shape_follows_type_and_labels() {
        let store = MetricStore::new();
        let cases = [
            (def("counter", "a", &[]), "ScalarCounter"),
            (def("counter", "b", &["env"]), "VectorCounter"),
            (def("gauge", "c", &[]), "ScalarGauge"),
            (def("gauge", "d", &["env", "zone"]), "VectorGauge"),
        ];
        for (d, want) in cases {
            let m = MetricInstance::register(&d, &store).unwrap();
            let got = match m.kind() {
                MetricKind::ScalarCounter(_) => "ScalarCounter",
                MetricKind::VectorCounter(_) => "VectorCounter",
                MetricKind::ScalarGauge(_) => "ScalarGauge",
                MetricKind::VectorGauge(_) => "VectorGauge",
            };
            assert_eq!(got, want);
        }
    }

    #[test]
    fn unknown_type_is_not_registered() {
        let store = MetricStore::new();
        let err = MetricInstance::register(&def("summary", "lat", &[]), &store).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_METRIC_TYPE");
        assert!(store.is_empty());
    }

    #[test]
    fn inc_ignores_value_and_add_uses_it() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("counter", "requests", &[]), &store).unwrap();
        m.apply(Command::Increment, &[], 40.0).unwrap();
        assert_eq!(store.value("utm_app_requests", &[]), Some(1.0));
        m.apply(Command::Add, &[], 2.5).unwrap();
        assert_eq!(store.value("utm_app_requests", &[]), Some(3.5));
    }

    #[test]
    fn labelled_counter_requires_exact_arity() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("counter", "hits", &["env"]), &store).unwrap();
        for bad in [vals(&[]), vals(&["prod", "eu"])] {
            let err = m.apply(Command::Increment, &bad, 0.0).unwrap_err();
            assert_eq!(err.code(), "LABEL_ARITY_MISMATCH");
        }
        m.apply(Command::Increment, &vals(&["prod"]), 0.0).unwrap();
        assert_eq!(store.value("utm_app_hits", &["prod"]), Some(1.0));
    }

    #[test]
    fn scalar_metric_rejects_label_values() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("gauge", "temp", &[]), &store).unwrap();
        let err = m.apply(Command::Add, &vals(&["x"]), 1.0).unwrap_err();
        assert_eq!(err.code(), "LABEL_ARITY_MISMATCH");
        assert_eq!(store.value("utm_app_temp", &[]), Some(0.0));
    }

    #[test]
    fn gauge_moves_both_ways() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("gauge", "queue", &["status"]), &store).unwrap();
        m.handle(&decode(br#"{"name":"utm_app_queue","labels":["ok"],"command":"add","value":5}"#).unwrap())
            .unwrap();
        m.handle(&decode(br#"{"name":"utm_app_queue","labels":["ok"],"command":"add","value":-2}"#).unwrap())
            .unwrap();
        assert_eq!(store.value("utm_app_queue", &["ok"]), Some(3.0));
        assert_eq!(store.value("utm_app_queue", &["failed"]), None);
    }

    #[test]
    fn unsupported_command_leaves_value_alone() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("counter", "requests", &[]), &store).unwrap();
        let err = m
            .handle(&decode(br#"{"name":"utm_app_requests","command":"set","value":9}"#).unwrap())
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_COMMAND");
        assert_eq!(store.value("utm_app_requests", &[]), Some(0.0));
    }

    #[test]
    fn counter_add_negative_is_refused_by_store() {
        let store = MetricStore::new();
        let m = MetricInstance::register(&def("counter", "requests", &[]), &store).unwrap();
        let err = m.apply(Command::Add, &[], -1.0).unwrap_err();
        assert_eq!(err.code(), "INVALID_VALUE");
    }
}
