//! In-process metrics store backing the `/metrics` endpoint.
//!
//! No client library is used; this module provides counter/gauge families,
//! scalar or label-partitioned, backed by `DashMap` and atomics. Label values
//! are positional: a series is keyed by the ordered tuple of values matching
//! the family's label names. Values are `f64` kept as bit patterns in
//! `AtomicU64`, so the receiver can write while scrapes read without locks.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use udpmetrics_core::error::{BridgeError, Result};
use udpmetrics_core::protocol::MetricType;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}

fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `f64` cell updated with a compare-exchange loop.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn add(&self, v: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + v).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Counters only move up.
fn check_counter_delta(name: &str, v: f64) -> Result<()> {
    if v.is_nan() || v < 0.0 {
        return Err(BridgeError::InvalidValue(format!(
            "counter {name} cannot be changed by {v}"
        )));
    }
    Ok(())
}

type SeriesMap = DashMap<Vec<String>, AtomicF64>;

/// Label-partitioned cells shared by `CounterVec`/`GaugeVec`.
#[derive(Debug)]
struct Series {
    name: String,
    label_names: Vec<String>,
    cells: SeriesMap,
}

impl Series {
    fn add<S: AsRef<str>>(&self, values: &[S], v: f64) -> Result<()> {
        if values.len() != self.label_names.len() {
            return Err(BridgeError::LabelArityMismatch {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }
        let key: Vec<String> = values.iter().map(|s| s.as_ref().to_string()).collect();
        self.cells.entry(key).or_insert_with(AtomicF64::default).add(v);
        Ok(())
    }

    fn get(&self, values: &[&str]) -> Option<f64> {
        let key: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        self.cells.get(&key).map(|c| c.get())
    }
}

#[derive(Debug)]
enum Cells {
    Scalar(Arc<AtomicF64>),
    Vector(Arc<Series>),
}

#[derive(Debug)]
struct Family {
    help: String,
    kind: MetricType,
    cells: Cells,
}

/// Unlabelled counter handle.
#[derive(Debug, Clone)]
pub struct Counter {
    name: Arc<str>,
    cell: Arc<AtomicF64>,
}

impl Counter {
    pub fn inc(&self) {
        self.cell.add(1.0);
    }

    pub fn add(&self, v: f64) -> Result<()> {
        check_counter_delta(&self.name, v)?;
        self.cell.add(v);
        Ok(())
    }

    pub fn get(&self) -> f64 {
        self.cell.get()
    }
}

/// Labelled counter handle.
#[derive(Debug, Clone)]
pub struct CounterVec {
    series: Arc<Series>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        self.series.add(values, 1.0)
    }

    /// Increment by an arbitrary non-negative value.
    pub fn add<S: AsRef<str>>(&self, values: &[S], v: f64) -> Result<()> {
        check_counter_delta(&self.series.name, v)?;
        self.series.add(values, v)
    }

    /// Current value of one series; `None` if never touched.
    pub fn get(&self, values: &[&str]) -> Option<f64> {
        self.series.get(values)
    }
}

/// Unlabelled gauge handle.
#[derive(Debug, Clone)]
pub struct Gauge {
    cell: Arc<AtomicF64>,
}

impl Gauge {
    pub fn inc(&self) {
        self.cell.add(1.0);
    }

    /// Add a signed delta.
    pub fn add(&self, v: f64) {
        self.cell.add(v);
    }

    pub fn get(&self) -> f64 {
        self.cell.get()
    }
}

/// Labelled gauge handle.
#[derive(Debug, Clone)]
pub struct GaugeVec {
    series: Arc<Series>,
}

impl GaugeVec {
    pub fn inc<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        self.series.add(values, 1.0)
    }

    /// Add a signed delta.
    pub fn add<S: AsRef<str>>(&self, values: &[S], v: f64) -> Result<()> {
        self.series.add(values, v)
    }

    pub fn get(&self, values: &[&str]) -> Option<f64> {
        self.series.get(values)
    }
}

/// Registry of metric families, keyed by full metric name.
///
/// Construct once and share via `Arc`; the receiver writes through handles
/// while the HTTP endpoint renders.
#[derive(Debug, Default)]
pub struct MetricStore {
    families: DashMap<String, Family>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str, help: &str) -> Result<Counter> {
        let cell = Arc::new(AtomicF64::default());
        self.register(name, help, MetricType::Counter, Cells::Scalar(Arc::clone(&cell)))?;
        Ok(Counter { name: name.into(), cell })
    }

    pub fn counter_vec(&self, name: &str, help: &str, label_names: &[String]) -> Result<CounterVec> {
        let series = self.new_series(name, label_names)?;
        self.register(name, help, MetricType::Counter, Cells::Vector(Arc::clone(&series)))?;
        Ok(CounterVec { series })
    }

    pub fn gauge(&self, name: &str, help: &str) -> Result<Gauge> {
        let cell = Arc::new(AtomicF64::default());
        self.register(name, help, MetricType::Gauge, Cells::Scalar(Arc::clone(&cell)))?;
        Ok(Gauge { cell })
    }

    pub fn gauge_vec(&self, name: &str, help: &str, label_names: &[String]) -> Result<GaugeVec> {
        let series = self.new_series(name, label_names)?;
        self.register(name, help, MetricType::Gauge, Cells::Vector(Arc::clone(&series)))?;
        Ok(GaugeVec { series })
    }

    /// Drop a family. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        self.families.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Current value of a series. Scalars are read with empty `values`.
    pub fn value(&self, name: &str, values: &[&str]) -> Option<f64> {
        let family = self.families.get(name)?;
        match &family.cells {
            Cells::Scalar(cell) if values.is_empty() => Some(cell.get()),
            Cells::Scalar(_) => None,
            Cells::Vector(series) => series.get(values),
        }
    }

    fn new_series(&self, name: &str, label_names: &[String]) -> Result<Arc<Series>> {
        if label_names.is_empty() {
            return Err(BridgeError::Registration(format!(
                "{name}: labelled family needs at least one label"
            )));
        }
        for (i, l) in label_names.iter().enumerate() {
            if !valid_label_name(l) {
                return Err(BridgeError::Registration(format!("{name}: invalid label name {l:?}")));
            }
            if label_names[..i].contains(l) {
                return Err(BridgeError::Registration(format!("{name}: duplicate label name {l:?}")));
            }
        }
        Ok(Arc::new(Series {
            name: name.to_string(),
            label_names: label_names.to_vec(),
            cells: DashMap::new(),
        }))
    }

    fn register(&self, name: &str, help: &str, kind: MetricType, cells: Cells) -> Result<()> {
        if !valid_metric_name(name) {
            return Err(BridgeError::Registration(format!("invalid metric name {name:?}")));
        }
        match self.families.entry(name.to_string()) {
            Entry::Occupied(_) => Err(BridgeError::Registration(format!(
                "metric family {name} already registered"
            ))),
            Entry::Vacant(v) => {
                v.insert(Family {
                    help: help.to_string(),
                    kind,
                    cells,
                });
                Ok(())
            }
        }
    }

    /// Render all families in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut names: Vec<String> = self.families.iter().map(|r| r.key().clone()).collect();
        names.sort();

        let mut out = String::new();
        for name in names {
            let Some(family) = self.families.get(&name) else { continue };
            if !family.help.is_empty() {
                let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
            }
            let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());
            match &family.cells {
                Cells::Scalar(cell) => {
                    let _ = writeln!(out, "{} {}", name, fmt_value(cell.get()));
                }
                Cells::Vector(series) => {
                    let mut rows: Vec<(Vec<String>, f64)> = series
                        .cells
                        .iter()
                        .map(|r| (r.key().clone(), r.value().get()))
                        .collect();
                    rows.sort_by(|a, b| a.0.cmp(&b.0));
                    for (values, v) in rows {
                        let label_str = series
                            .label_names
                            .iter()
                            .zip(values.iter())
                            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                            .collect::<Vec<_>>()
                            .join(",");
                        let _ = writeln!(out, "{}{{{}}} {}", name, label_str, fmt_value(v));
                    }
                }
            }
        }
        out
    }
}
