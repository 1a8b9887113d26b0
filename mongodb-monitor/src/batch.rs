//! Push payload records
//!
//! Records are attributed to the collecting host (`endpoint`); the monitored
//! instance is identified through the `port=` tag.

use crate::config::Instance;
use crate::filter::{CounterType, TaggedMetric};
use crate::normalize::FLATTEN_SEPARATOR;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Prefix of every metric name
pub const METRIC_NAMESPACE: &str = "mongo";

/// One sample as accepted by `POST /v1/push`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub endpoint: String,
    pub metric: String,
    pub tags: String,
    pub timestamp: i64,
    pub value: Number,
    pub step: u64,
    #[serde(rename = "counterType")]
    pub counter_type: CounterType,
}

/// Per-instance record factory; every record shares one timestamp
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    endpoint: String,
    tags: String,
    timestamp: i64,
    step: u64,
}

impl BatchBuilder {
    pub fn new(endpoint: impl Into<String>, instance: &Instance, timestamp: i64, step: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            tags: format!("port={}", instance.port),
            timestamp,
            step,
        }
    }

    pub fn record(&self, metric: TaggedMetric) -> MetricRecord {
        MetricRecord {
            endpoint: self.endpoint.clone(),
            metric: metric_name(&metric.key),
            tags: self.tags.clone(),
            timestamp: self.timestamp,
            value: metric.value,
            step: self.step,
            counter_type: metric.kind,
        }
    }

    pub fn build(&self, metrics: Vec<TaggedMetric>) -> Vec<MetricRecord> {
        metrics.into_iter().map(|m| self.record(m)).collect()
    }
}

/// `globalLock_currentQueue_total` -> `mongo.globalLock.currentQueue.total`
pub fn metric_name(key: &str) -> String {
    format!("{}.{}", METRIC_NAMESPACE, key.replace(FLATTEN_SEPARATOR, "."))
}

/// Hostname of the machine running the collector
pub fn local_hostname() -> String {
    gethostname::gethostname().to_string_lossy().to_string()
}
