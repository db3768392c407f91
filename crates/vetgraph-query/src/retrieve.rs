//! Intent → read template dispatch.

use tracing::debug;

use crate::types::{Entities, Intent};
use vetgraph_core::Result;
use vetgraph_store::{RetrievalRecord, SqliteStore};

/// Runs the read template for an intent against the primary drug mention.
pub struct RetrievalRouter<'a> {
    store: &'a SqliteStore,
}

impl<'a> RetrievalRouter<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Empty record when no drug was mentioned; the store is not queried then.
    pub fn retrieve(&self, intent: Intent, entities: &Entities) -> Result<RetrievalRecord> {
        let Some(drug) = entities.primary_drug() else {
            debug!("No drug mentioned, skipping {} lookup", intent);
            return Ok(RetrievalRecord::empty());
        };
        debug!("Routing {} query for {:?}", intent, drug);
        self.store.run_template(intent.template(), drug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vetgraph_ingest::{DrugRecord, GraphIngestor};

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        GraphIngestor::new(&store)
            .ingest(&DrugRecord {
                name: Some("Acarbose".into()),
                uses: Some("Diabetes management in dogs".into()),
                storage: Some("Store below 25C".into()),
                dosage: Some("Dogs: 12.5-25 mg with meals".into()),
                ..Default::default()
            })
            .unwrap();
        (store, dir)
    }

    #[test]
    fn test_no_drug_means_empty_record_for_every_intent() {
        let (store, _dir) = test_store();
        let router = RetrievalRouter::new(&store);
        let entities = Entities {
            animals: vec!["dog".into()],
            ..Default::default()
        };
        for intent in Intent::ALL {
            assert!(router.retrieve(intent, &entities).unwrap().is_empty());
        }
    }

    #[test]
    fn test_storage_lookup() {
        let (store, _dir) = test_store();
        let record = RetrievalRouter::new(&store)
            .retrieve(Intent::Storage, &Entities::with_drug("Acarbose"))
            .unwrap();
        assert_eq!(record.get_str("storage"), Some("Store below 25C"));
    }

    #[test]
    fn test_usage_lookup_includes_dosage() {
        let (store, _dir) = test_store();
        let record = RetrievalRouter::new(&store)
            .retrieve(Intent::Usage, &Entities::with_drug("acarbose"))
            .unwrap();
        assert_eq!(record.get_str("uses"), Some("Diabetes management in dogs"));
        assert_eq!(record.get_str("dosage"), Some("Dogs: 12.5-25 mg with meals"));
    }

    #[test]
    fn test_only_first_drug_is_used() {
        let (store, _dir) = test_store();
        let entities = Entities {
            drugs: vec!["Unknownium".into(), "Acarbose".into()],
            ..Default::default()
        };
        let record = RetrievalRouter::new(&store)
            .retrieve(Intent::General, &entities)
            .unwrap();
        assert!(record.is_empty());
    }
}
