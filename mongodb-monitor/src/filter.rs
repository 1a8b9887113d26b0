//! Metric selection and counter/gauge tagging
//!
//! Two gates, applied in order: the ignore-list removes instance identity
//! fields wherever they sit in the document, then the whitelist keeps only
//! known metrics and attaches their kind.

use crate::normalize::{FlatMetricMap, FLATTEN_SEPARATOR};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::debug;

/// Synthetic liveness field set by the collector, not by mongod
pub const ALIVE_KEY: &str = "alive";

/// Instance metadata, never reported
pub const IGNORE_KEYS: &[&str] = &[
    "host",
    "version",
    "process",
    "pid",
    "uptime",
    "uptimeMillis",
    "uptimeEstimate",
    "localTime",
];

/// Monitored metrics and their kind, keyed by flattened name
pub const METRICS: &[(&str, CounterType)] = &[
    ("opcounters_insert", CounterType::Counter),
    ("opcounters_query", CounterType::Counter),
    ("opcounters_update", CounterType::Counter),
    ("opcounters_delete", CounterType::Counter),
    ("opcounters_getmore", CounterType::Counter),
    ("opcounters_command", CounterType::Counter),
    ("mem_mapped", CounterType::Gauge),
    ("mem_virtual", CounterType::Gauge),
    ("mem_resident", CounterType::Gauge),
    ("extra_info_page_faults", CounterType::Gauge),
    ("globalLock_currentQueue_total", CounterType::Gauge),
    ("globalLock_currentQueue_readers", CounterType::Gauge),
    ("globalLock_currentQueue_writers", CounterType::Gauge),
    ("globalLock_activeClients_total", CounterType::Gauge),
    ("globalLock_activeClients_readers", CounterType::Gauge),
    ("globalLock_activeClients_writers", CounterType::Gauge),
    ("connections_current", CounterType::Gauge),
];

/// Metric kind as understood by the push agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CounterType {
    /// Cumulative, never decreasing
    Counter,
    /// Point-in-time reading
    Gauge,
}

/// A whitelisted metric ready for batching
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedMetric {
    pub key: String,
    pub value: Number,
    pub kind: CounterType,
}

/// Whitelist lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricFilter {
    report_liveness: bool,
}

impl MetricFilter {
    pub fn new(report_liveness: bool) -> Self {
        Self { report_liveness }
    }

    /// Kind of a flattened key, or `None` if it is not monitored
    pub fn kind_of(&self, key: &str) -> Option<CounterType> {
        if self.report_liveness && key == ALIVE_KEY {
            return Some(CounterType::Gauge);
        }
        METRICS.iter().find(|(name, _)| *name == key).map(|(_, kind)| *kind)
    }

    /// Apply ignore-list then whitelist
    pub fn apply(&self, flat: &FlatMetricMap) -> Vec<TaggedMetric> {
        flat.iter()
            .filter(|(key, _)| !is_ignored(key))
            .filter_map(|(key, value)| {
                let kind = self.kind_of(key)?;
                match numeric_value(value) {
                    Some(value) => Some(TaggedMetric {
                        key: key.clone(),
                        value,
                        kind,
                    }),
                    None => {
                        debug!("Dropping {}: non-numeric value {}", key, value);
                        None
                    }
                }
            })
            .collect()
    }
}

/// True when the leaf name of `key` is instance metadata (case-insensitive)
pub fn is_ignored(key: &str) -> bool {
    let leaf = key.rsplit(FLATTEN_SEPARATOR).next().unwrap_or(key);
    IGNORE_KEYS
        .iter()
        .any(|ignored| ignored.eq_ignore_ascii_case(key) || ignored.eq_ignore_ascii_case(leaf))
}

/// Numbers pass through, booleans become 0/1, numeric strings are parsed
fn numeric_value(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}
