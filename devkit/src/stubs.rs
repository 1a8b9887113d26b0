/*!
Stubs des deux frontières externes du collecteur

`ScriptedFetcher` remplace le shell mongo, `RecordingSink` remplace l'agent
HTTP. Les deux sont clonables et partagent leur état, pour inspection après
un `Runner::run`.
*/

use async_trait::async_trait;
use mongodb_monitor::{Instance, MetricRecord, MetricSink, PushOutcome, StatusFetcher, StatusReply};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fetcher répondant selon `host:port`; instance inconnue => injoignable
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    replies: Arc<Mutex<HashMap<String, StatusReply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// L'instance répond avec `output` sur stdout
    pub fn alive(self, instance: &Instance, output: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(instance.to_string(), StatusReply::Alive(output.into()));
        self
    }

    /// L'instance simule un code de sortie non nul
    pub fn unreachable(self, instance: &Instance) -> Self {
        self.replies.lock().unwrap().insert(
            instance.to_string(),
            StatusReply::Unreachable("mongo shell exited with status 1".into()),
        );
        self
    }

    /// Instances interrogées, dans l'ordre
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusFetcher for ScriptedFetcher {
    async fn fetch(&self, instance: &Instance) -> StatusReply {
        let key = instance.to_string();
        self.calls.lock().unwrap().push(key.clone());
        self.replies
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| StatusReply::Unreachable(format!("no scripted reply for {}", key)))
    }
}

/// Sink qui enregistre chaque appel à `push`
#[derive(Clone, Default)]
pub struct RecordingSink {
    pushes: Arc<Mutex<Vec<Vec<MetricRecord>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches reçus, un par appel
    pub fn pushes(&self) -> Vec<Vec<MetricRecord>> {
        self.pushes.lock().unwrap().clone()
    }

    /// Nombre d'appels à `push`, y compris les batches vides
    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }
}

#[async_trait]
impl MetricSink for RecordingSink {
    async fn push(&self, records: &[MetricRecord]) -> PushOutcome {
        self.pushes.lock().unwrap().push(records.to_vec());
        if records.is_empty() {
            PushOutcome::Skipped
        } else {
            PushOutcome::Delivered {
                status: 200,
                body: "success".into(),
            }
        }
    }
}
