//! In-memory undirected projection of the drug graph using petgraph.
//!
//! Nodes are keyed by name; relationship type and direction are dropped and
//! parallel edges collapse into one.

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Relationship;

/// Undirected simple graph built from relationship triples.
pub struct GraphProjection {
    graph: UnGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
}

impl GraphProjection {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            node_index: HashMap::new(),
        }
    }

    /// Add one relationship. Returns `false` if the pair was already linked.
    pub fn add_relationship(&mut self, rel: &Relationship) -> bool {
        let a = self.intern(&rel.source);
        let b = self.intern(&rel.target);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    fn intern(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    pub fn graph(&self) -> &UnGraph<String, ()> {
        &self.graph
    }

    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Get projection statistics.
    pub fn stats(&self) -> ProjectionStats {
        ProjectionStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }
}

impl Default for GraphProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> FromIterator<&'r Relationship> for GraphProjection {
    fn from_iter<I: IntoIterator<Item = &'r Relationship>>(iter: I) -> Self {
        let mut projection = Self::new();
        for rel in iter {
            projection.add_relationship(rel);
        }
        projection
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionStats {
    pub node_count: usize,
    pub edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelType;

    fn rel(source: &str, target: &str, rel_type: RelType) -> Relationship {
        Relationship {
            source: source.into(),
            target: target.into(),
            rel_type,
        }
    }

    #[test]
    fn test_multi_edges_collapse() {
        let rels = [
            rel("Acarbose", "Vomiting", RelType::HasSideEffect),
            rel("Acarbose", "Vomiting", RelType::Treats),
            rel("Vomiting", "Acarbose", RelType::InteractsWith),
            rel("Acarbose", "Diabetes", RelType::Treats),
        ];
        let projection: GraphProjection = rels.iter().collect();
        let stats = projection.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 2);
        let mut names: Vec<&str> = projection
            .graph()
            .node_indices()
            .map(|idx| projection.name(idx))
            .collect();
        names.sort();
        assert_eq!(names, vec!["Acarbose", "Diabetes", "Vomiting"]);
    }

    #[test]
    fn test_empty_projection() {
        let projection = GraphProjection::new();
        assert!(projection.is_empty());
        assert_eq!(projection.stats().node_count, 0);
    }

    #[test]
    fn test_self_loop_kept_once() {
        let mut projection = GraphProjection::new();
        assert!(projection.add_relationship(&rel("X", "X", RelType::InteractsWith)));
        assert!(!projection.add_relationship(&rel("X", "X", RelType::Treats)));
        assert_eq!(projection.stats().node_count, 1);
        assert_eq!(projection.stats().edge_count, 1);
    }
}
