/*!
Test Harness pour le collecteur

Assemble un `Runner` avec `ScriptedFetcher` et `RecordingSink`, et une
config sans fichier.
*/

use crate::stubs::{RecordingSink, ScriptedFetcher};
use mongodb_monitor::{Instance, MonitorConfig, RunSummary, Runner};

/// Nom d'hôte du collecteur simulé
pub const COLLECTOR_HOSTNAME: &str = "collector01";

/// Harness de test complet
pub struct TestHarness {
    pub config: MonitorConfig,
    pub fetcher: ScriptedFetcher,
    pub sink: RecordingSink,
}

impl TestHarness {
    /// Harness sans instance; logs des tests sur stdout si `RUST_LOG` est posé
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut config = MonitorConfig::default();
        config.instances.clear();

        Self {
            config,
            fetcher: ScriptedFetcher::new(),
            sink: RecordingSink::new(),
        }
    }

    /// Ajoute une instance qui répond avec `output`
    pub fn with_alive(mut self, instance: Instance, output: &str) -> Self {
        self.fetcher = self.fetcher.alive(&instance, output);
        self.config.instances.push(instance);
        self
    }

    /// Ajoute une instance injoignable
    pub fn with_unreachable(mut self, instance: Instance) -> Self {
        self.fetcher = self.fetcher.unreachable(&instance);
        self.config.instances.push(instance);
        self
    }

    pub fn runner(&self) -> Runner<ScriptedFetcher, RecordingSink> {
        Runner::new(&self.config, self.fetcher.clone(), self.sink.clone(), COLLECTOR_HOSTNAME)
    }

    /// Lance une passe complète
    pub async fn run(&self) -> RunSummary {
        self.runner().run().await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
