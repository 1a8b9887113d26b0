/*!
# MongoDB Monitor DevKit - stubs et fixtures pour les tests

Bibliothèque facilitant les tests du collecteur sans mongod ni agent de push:
- Fetcher scripté (réponses par instance, sans processus externe)
- Sink enregistreur (capture chaque batch poussé)
- Sorties `printjson(db.serverStatus())` réalistes
*/

pub mod fixtures;
pub mod stubs;
pub mod harness;

pub use harness::TestHarness;
pub use stubs::{RecordingSink, ScriptedFetcher};
