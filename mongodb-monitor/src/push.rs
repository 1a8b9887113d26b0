//! Batch delivery to the local push agent
//!
//! One POST per run, no retry. Transport failures are logged and reported as
//! [`PushOutcome::Failed`]; they never abort the run.

use crate::batch::MetricRecord;
use crate::config::PushConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// What happened to a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Empty batch, nothing sent
    Skipped,
    /// The agent answered (any status code)
    Delivered { status: u16, body: String },
    /// Request could not be completed
    Failed(String),
}

#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn push(&self, records: &[MetricRecord]) -> PushOutcome;
}

/// JSON-over-HTTP sink (`POST <url>` with the records as an array)
#[derive(Debug, Clone)]
pub struct HttpPusher {
    client: reqwest::Client,
    url: String,
}

impl HttpPusher {
    pub fn new(config: &PushConfig) -> anyhow::Result<Self> {
        Self::with_timeout(config.url.clone(), config.timeout())
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mongodb-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url: url.into() })
    }

    async fn send(&self, records: &[MetricRecord]) -> reqwest::Result<(u16, String)> {
        let response = self.client.post(&self.url).json(records).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl MetricSink for HttpPusher {
    async fn push(&self, records: &[MetricRecord]) -> PushOutcome {
        if records.is_empty() {
            info!("push skipped: empty payload");
            return PushOutcome::Skipped;
        }

        match self.send(records).await {
            Ok((status, body)) => {
                info!("push data status: {}", body);
                PushOutcome::Delivered { status, body }
            }
            Err(e) => {
                warn!("push data status failed, Exception: {:?}", e);
                PushOutcome::Failed(e.to_string())
            }
        }
    }
}
