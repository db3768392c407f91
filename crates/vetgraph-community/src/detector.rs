//! Community detection pass: project → cluster → write labels back.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::louvain::{louvain, modularity, LouvainConfig};
use vetgraph_core::Result;
use vetgraph_store::{Filter, GraphProjection, SqliteStore};

/// Node key → community id.
pub type CommunityMap = BTreeMap<String, usize>;

/// Runs Louvain over the store's current relationship set.
///
/// Assumes a quiescent graph: run it after ingestion, not alongside a
/// re-import.
pub struct CommunityDetector<'a> {
    store: &'a SqliteStore,
    config: LouvainConfig,
}

impl<'a> CommunityDetector<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self::with_config(store, LouvainConfig::default())
    }

    pub fn with_config(store: &'a SqliteStore, config: LouvainConfig) -> Self {
        Self { store, config }
    }

    /// Read every relationship into an undirected simple graph keyed by node
    /// key. Relationship types and direction are dropped.
    pub fn build_projection(&self) -> Result<GraphProjection> {
        let mut projection = GraphProjection::new();
        for rel in self.store.read_all(&Filter::Any, &Filter::Any) {
            projection.add_relationship(&rel?);
        }
        let stats = projection.stats();
        debug!(
            "Projected {} nodes and {} edges",
            stats.node_count, stats.edge_count
        );
        Ok(projection)
    }

    /// Cluster the projection. Empty when it has no edges.
    pub fn detect(&self, projection: &GraphProjection) -> CommunityMap {
        if projection.is_empty() {
            return CommunityMap::new();
        }
        let graph = projection.graph();
        let partition = louvain(graph, &self.config);
        debug!(
            "Louvain modularity {:.4}",
            modularity(graph, &partition, self.config.resolution)
        );
        graph
            .node_indices()
            .map(|idx| (projection.name(idx).to_string(), partition[idx.index()]))
            .collect()
    }

    /// Write one label per entry, overwriting earlier labels. Returns how many
    /// nodes were updated.
    pub fn persist(&self, communities: &CommunityMap) -> Result<usize> {
        let mut updated = 0;
        for (key, &community) in communities {
            updated += self.store.set_community(key, community as i64)?;
        }
        Ok(updated)
    }

    /// Project, detect and persist.
    pub fn run(&self) -> Result<CommunityMap> {
        let start = Instant::now();
        let projection = self.build_projection()?;
        let communities = self.detect(&projection);
        let updated = self.persist(&communities)?;

        let count = communities.values().max().map_or(0, |&c| c + 1);
        info!(
            "Detected {} communities over {} nodes ({} labels written) in {}ms",
            count,
            communities.len(),
            updated,
            start.elapsed().as_millis()
        );
        Ok(communities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::TempDir;
    use vetgraph_store::{DrugProperties, NodeLabel, NodeRef, RelType};

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn add_drug(store: &SqliteStore, name: &str) {
        store
            .upsert_drug(&DrugProperties {
                name: name.into(),
                ..Default::default()
            })
            .unwrap();
    }

    fn link(store: &SqliteStore, drug: &str, rel: RelType, target: &str) {
        store
            .upsert_relationship(
                &NodeRef::drug(drug),
                rel,
                &NodeRef::new(rel.target_label(), target),
                &Map::new(),
            )
            .unwrap();
    }

    /// Two drug clusters sharing no targets.
    fn seeded_store() -> (SqliteStore, TempDir) {
        let (store, dir) = test_store();
        for drug in ["Acarbose", "Glipizide", "Amoxicillin", "Cefalexin"] {
            add_drug(&store, drug);
        }
        link(&store, "Acarbose", RelType::Treats, "Diabetes");
        link(&store, "Glipizide", RelType::Treats, "Diabetes");
        link(&store, "Acarbose", RelType::HasSideEffect, "Hypoglycemia");
        link(&store, "Glipizide", RelType::HasSideEffect, "Hypoglycemia");
        link(&store, "Amoxicillin", RelType::Treats, "Bacterial infection");
        link(&store, "Cefalexin", RelType::Treats, "Bacterial infection");
        link(&store, "Amoxicillin", RelType::HasSideEffect, "Vomiting");
        link(&store, "Cefalexin", RelType::HasSideEffect, "Vomiting");
        (store, dir)
    }

    #[test]
    fn test_run_separates_clusters() {
        let (store, _dir) = seeded_store();
        let communities = CommunityDetector::new(&store).run().unwrap();

        assert_eq!(communities.len(), 8);
        assert_eq!(communities["Acarbose"], communities["Glipizide"]);
        assert_eq!(communities["Acarbose"], communities["Diabetes"]);
        assert_eq!(communities["Amoxicillin"], communities["Vomiting"]);
        assert_ne!(communities["Acarbose"], communities["Amoxicillin"]);
    }

    #[test]
    fn test_every_endpoint_labelled_isolated_untouched() {
        let (store, _dir) = seeded_store();
        add_drug(&store, "Lonely");

        CommunityDetector::new(&store).run().unwrap();

        for label in [NodeLabel::Drug, NodeLabel::Condition, NodeLabel::Effect] {
            for key in store.node_keys(label).unwrap() {
                let node = store.get_node(&NodeRef::new(label, key.as_str())).unwrap().unwrap();
                if key == "Lonely" {
                    assert!(node.community.is_none());
                } else {
                    assert!(node.community.is_some(), "{key} has no community");
                }
            }
        }
    }

    #[test]
    fn test_rerun_overwrites_labels() {
        let (store, _dir) = seeded_store();
        store.set_community("Acarbose", 99).unwrap();

        let communities = CommunityDetector::new(&store).run().unwrap();
        let node = store.get_node(&NodeRef::drug("Acarbose")).unwrap().unwrap();
        assert_eq!(node.community, Some(communities["Acarbose"] as i64));
        assert!(communities.values().all(|&c| c < 8));
    }

    #[test]
    fn test_empty_graph_is_not_an_error() {
        let (store, _dir) = test_store();
        add_drug(&store, "Acarbose");

        let detector = CommunityDetector::new(&store);
        let projection = detector.build_projection().unwrap();
        assert!(projection.is_empty());

        let communities = detector.detect(&projection);
        assert!(communities.is_empty());
        assert_eq!(detector.persist(&communities).unwrap(), 0);
        assert!(detector.run().unwrap().is_empty());
    }

    #[test]
    fn test_projection_collapses_edge_types() {
        let (store, _dir) = test_store();
        add_drug(&store, "Acarbose");
        add_drug(&store, "Digoxin");
        link(&store, "Acarbose", RelType::InteractsWith, "Digoxin");
        link(&store, "Digoxin", RelType::InteractsWith, "Acarbose");

        let projection = CommunityDetector::new(&store).build_projection().unwrap();
        assert_eq!(projection.stats().node_count, 2);
        assert_eq!(projection.stats().edge_count, 1);
    }
}
