//! VetGraph Community: projects stored relationships into an undirected
//! graph, clusters it with Louvain and writes community labels back.

pub mod detector;
pub mod louvain;

pub use detector::{CommunityDetector, CommunityMap};
pub use louvain::{louvain, modularity, LouvainConfig};
