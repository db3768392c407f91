//! Louvain modularity optimisation.
//!
//! Q = (1/2m) * Σij[Aij - γ·(ki*kj)/(2m)] * δ(ci, cj)
//!
//! Each level runs local moving until no node changes community, then
//! collapses every community into a single node (internal edges become a
//! self-loop) and repeats on the smaller graph. Nodes live in an index arena;
//! visiting order is index order, so the same graph always gives the same
//! partition.

use std::collections::BTreeMap;

use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LouvainConfig {
    /// Resolution γ (higher = more, smaller communities)
    pub resolution: f64,
    /// Maximum local-moving passes per level
    pub max_passes: usize,
    /// A move must beat staying put by more than this
    pub min_gain: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_passes: 100,
            min_gain: 1e-7,
        }
    }
}

impl LouvainConfig {
    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }
}

/// One level of the weighted graph.
struct Level {
    /// Neighbours and edge weights, stored in both directions. No self-loops.
    adj: Vec<Vec<(usize, f64)>>,
    /// Self-loop weight per node.
    loops: Vec<f64>,
}

impl Level {
    fn from_graph<N, E>(graph: &UnGraph<N, E>) -> Self {
        let n = graph.node_count();
        let mut adj = vec![Vec::new(); n];
        let mut loops = vec![0.0; n];
        for edge in graph.raw_edges() {
            let (a, b) = (edge.source().index(), edge.target().index());
            if a == b {
                loops[a] += 1.0;
            } else {
                adj[a].push((b, 1.0));
                adj[b].push((a, 1.0));
            }
        }
        Self { adj, loops }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn degree(&self, i: usize) -> f64 {
        self.adj[i].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.loops[i]
    }

    /// Move nodes between communities until no move improves modularity.
    /// Returns each node's community id (not yet contiguous).
    fn local_moving(&self, config: &LouvainConfig) -> Vec<usize> {
        let n = self.len();
        let degrees: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let m2: f64 = degrees.iter().sum();

        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = degrees.clone();
        let mut link_weight = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();

        for _ in 0..config.max_passes {
            let mut moved = false;

            for node in 0..n {
                let k = degrees[node];
                let current = community[node];

                for &c in &touched {
                    link_weight[c] = 0.0;
                }
                touched.clear();
                for &(other, w) in &self.adj[node] {
                    let c = community[other];
                    if !touched.contains(&c) {
                        touched.push(c);
                    }
                    link_weight[c] += w;
                }

                totals[current] -= k;
                let gain = |c: usize, w: f64| w - config.resolution * totals[c] * k / m2;

                let mut best = current;
                let mut best_gain = gain(current, link_weight[current]);
                for &c in &touched {
                    let g = gain(c, link_weight[c]);
                    if g > best_gain + config.min_gain {
                        best = c;
                        best_gain = g;
                    }
                }

                totals[best] += k;
                if best != current {
                    community[node] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        community
    }

    /// Collapse each community into one node.
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut weights: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut loops = vec![0.0; count];

        for (node, edges) in self.adj.iter().enumerate() {
            let c = community[node];
            loops[c] += self.loops[node];
            for &(other, w) in edges {
                let d = community[other];
                if c == d {
                    // Seen once from each end.
                    loops[c] += w / 2.0;
                } else {
                    *weights[c].entry(d).or_insert(0.0) += w;
                }
            }
        }

        let adj = weights
            .into_iter()
            .map(|m| m.into_iter().collect())
            .collect();
        Self { adj, loops }
    }
}

/// Renumber ids to 0..k in order of first appearance. Returns k.
fn renumber(community: &mut [usize]) -> usize {
    let mut mapping = vec![usize::MAX; community.len()];
    let mut next = 0;
    for c in community.iter_mut() {
        if mapping[*c] == usize::MAX {
            mapping[*c] = next;
            next += 1;
        }
        *c = mapping[*c];
    }
    next
}

/// Partition `graph` into communities.
///
/// Returns one community id per node, indexed by `NodeIndex::index()`. Ids
/// are contiguous from 0. A graph with no edges leaves every node alone.
pub fn louvain<N, E>(graph: &UnGraph<N, E>, config: &LouvainConfig) -> Vec<usize> {
    let mut assignment: Vec<usize> = (0..graph.node_count()).collect();
    if graph.edge_count() == 0 {
        return assignment;
    }

    let mut level = Level::from_graph(graph);
    loop {
        let mut community = level.local_moving(config);
        let count = renumber(&mut community);
        for c in assignment.iter_mut() {
            *c = community[*c];
        }
        if count == level.len() {
            break;
        }
        level = level.aggregate(&community, count);
    }
    assignment
}

/// Modularity of `partition` on `graph` at the given resolution.
pub fn modularity<N, E>(graph: &UnGraph<N, E>, partition: &[usize], resolution: f64) -> f64 {
    let level = Level::from_graph(graph);
    let n = level.len();
    if n == 0 || partition.len() != n {
        return 0.0;
    }

    let count = partition.iter().max().map_or(0, |&c| c + 1);
    let mut internal = vec![0.0; count];
    let mut totals = vec![0.0; count];
    let mut m2 = 0.0;

    for node in 0..n {
        let c = partition[node];
        let k = level.degree(node);
        totals[c] += k;
        m2 += k;
        internal[c] += 2.0 * level.loops[node];
        for &(other, w) in &level.adj[node] {
            if partition[other] == c {
                internal[c] += w;
            }
        }
    }
    if m2 == 0.0 {
        return 0.0;
    }

    internal
        .iter()
        .zip(&totals)
        .map(|(&inside, &tot)| inside / m2 - resolution * (tot / m2).powi(2))
        .sum()
}
