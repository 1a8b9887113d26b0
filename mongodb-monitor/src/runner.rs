//! One collection pass over every configured instance
//!
//! Each instance runs fetch -> normalize -> filter -> batch on its own; a failure
//! is logged and costs only that instance's records. All batches are then
//! pushed together in a single request.

use crate::batch::{local_hostname, BatchBuilder, MetricRecord};
use crate::config::{Instance, MonitorConfig};
use crate::filter::{MetricFilter, ALIVE_KEY};
use crate::normalize::{self, FlatMetricMap, NormalizeError};
use crate::push::{HttpPusher, MetricSink, PushOutcome};
use crate::status::{MongoShellFetcher, StatusFetcher, StatusReply};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("malformed status document from {instance}: {source}")]
    Malformed {
        instance: String,
        #[source]
        source: NormalizeError,
    },
}

/// Records gathered from one instance
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBatch {
    pub alive: bool,
    pub records: Vec<MetricRecord>,
}

/// Totals for one pass
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub instances: usize,
    pub unreachable: usize,
    pub failed: usize,
    pub records: usize,
    pub push: PushOutcome,
    pub elapsed: Duration,
}

pub struct Runner<F, S> {
    instances: Vec<Instance>,
    fetcher: F,
    sink: S,
    filter: MetricFilter,
    hostname: String,
    step: u64,
    max_parallel: usize,
}

impl Runner<MongoShellFetcher, HttpPusher> {
    /// Runner backed by the mongo shell and the HTTP push agent
    pub fn from_config(config: &MonitorConfig) -> anyhow::Result<Self> {
        let fetcher = MongoShellFetcher::new(&config.collector);
        let sink = HttpPusher::new(&config.push)?;
        Ok(Self::new(config, fetcher, sink, local_hostname()))
    }
}

impl<F, S> Runner<F, S>
where
    F: StatusFetcher,
    S: MetricSink,
{
    pub fn new(config: &MonitorConfig, fetcher: F, sink: S, hostname: impl Into<String>) -> Self {
        Self {
            instances: config.instances.clone(),
            fetcher,
            sink,
            filter: MetricFilter::new(config.collector.report_liveness),
            hostname: hostname.into(),
            step: config.push.step_secs,
            max_parallel: config.collector.max_parallel.max(1),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Fetch, normalize, filter and batch one instance
    pub async fn collect_instance(&self, instance: &Instance) -> Result<InstanceBatch, CollectError> {
        let reply = self.fetcher.fetch(instance).await;
        let alive = reply.is_alive();

        let flat = match reply {
            StatusReply::Alive(raw) => {
                let mut flat = normalize::normalize(&raw).map_err(|source| CollectError::Malformed {
                    instance: instance.to_string(),
                    source,
                })?;
                flat.insert(ALIVE_KEY.to_string(), Value::from(1));
                flat
            }
            StatusReply::Unreachable(_) => FlatMetricMap::from([(ALIVE_KEY.to_string(), Value::from(0))]),
        };

        let timestamp = Utc::now().timestamp();
        let builder = BatchBuilder::new(self.hostname.as_str(), instance, timestamp, self.step);
        let records = builder.build(self.filter.apply(&flat));

        debug!("{}: {} of {} fields retained", instance, records.len(), flat.len());
        Ok(InstanceBatch { alive, records })
    }

    /// Collect every instance, push the combined batch once
    pub async fn run(&self) -> RunSummary {
        let start_time = Instant::now();

        let results: Vec<(&Instance, Result<InstanceBatch, CollectError>)> = stream::iter(&self.instances)
            .map(|instance| async move { (instance, self.collect_instance(instance).await) })
            .buffered(self.max_parallel)
            .collect()
            .await;

        let mut payload = Vec::new();
        let mut unreachable = 0;
        let mut failed = 0;
        for (instance, result) in results {
            match result {
                Ok(batch) => {
                    if !batch.alive {
                        unreachable += 1;
                    }
                    payload.extend(batch.records);
                }
                Err(e) => {
                    failed += 1;
                    error!("{} collection failed: {}", instance, e);
                }
            }
        }

        info!("payload length: {}", payload.len());
        let push = self.sink.push(&payload).await;

        let elapsed = start_time.elapsed();
        info!("Cost: {:.3}s", elapsed.as_secs_f64());

        RunSummary {
            instances: self.instances.len(),
            unreachable,
            failed,
            records: payload.len(),
            push,
            elapsed,
        }
    }
}
