//! Shared application state.

use parking_lot::RwLock;
use tracing::info;

use vetgraph_community::{CommunityDetector, CommunityMap, LouvainConfig};
use vetgraph_core::{Result, VetGraphConfig};
use vetgraph_query::{QueryClassifier, QueryEngine};
use vetgraph_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: VetGraphConfig,
    pub store: SqliteStore,
    /// Drug gazetteer; rebuilt after the graph changes.
    pub classifier: RwLock<QueryClassifier>,
}

impl AppState {
    pub fn new(config: VetGraphConfig, store: SqliteStore) -> Result<Self> {
        let classifier = QueryClassifier::from_store(&store)?;
        info!("Loaded {} drug names for entity extraction", classifier.known_drug_count());
        Ok(Self {
            config,
            store,
            classifier: RwLock::new(classifier),
        })
    }

    /// Reload the drug gazetteer from the store.
    pub fn refresh_classifier(&self) -> Result<usize> {
        let classifier = QueryClassifier::from_store(&self.store)?;
        let count = classifier.known_drug_count();
        *self.classifier.write() = classifier;
        Ok(count)
    }

    pub fn answer(&self, text: &str) -> Result<vetgraph_query::Answer> {
        let classifier = self.classifier.read();
        QueryEngine::new(&self.store, &classifier).answer_detailed(text)
    }

    pub fn detect_communities(&self) -> Result<CommunityMap> {
        let config = LouvainConfig::with_resolution(self.config.community_resolution);
        CommunityDetector::with_config(&self.store, config).run()
    }
}
