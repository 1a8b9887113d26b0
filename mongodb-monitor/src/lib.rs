//! MongoDB Monitor - one-shot serverStatus collector
//!
//! A single pass:
//! - Queries every configured instance with `mongo --eval "printjson(db.serverStatus())"`
//! - Strips shell wrappers and flattens the document into `a_b_c` keys
//! - Keeps whitelisted metrics, tagged COUNTER or GAUGE
//! - Pushes all records in one `POST /v1/push` to the local agent

pub mod batch;
pub mod config;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod push;
pub mod runner;
pub mod status;

pub use batch::{BatchBuilder, MetricRecord};
pub use config::{Instance, MonitorConfig};
pub use filter::{CounterType, MetricFilter};
pub use push::{HttpPusher, MetricSink, PushOutcome};
pub use runner::{CollectError, InstanceBatch, RunSummary, Runner};
pub use status::{MongoShellFetcher, StatusFetcher, StatusReply};
