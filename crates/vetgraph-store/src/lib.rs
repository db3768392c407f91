//! VetGraph Store: SQLite property graph with upsert semantics and read templates.

pub mod graph;
pub mod scan;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use graph::{GraphProjection, ProjectionStats};
pub use scan::RelationshipScan;
pub use sqlite::SqliteStore;
pub use types::*;
