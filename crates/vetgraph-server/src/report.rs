//! Graph report: the stats snapshot written as pretty JSON.

use std::path::Path;

use tracing::info;

use vetgraph_core::Result;
use vetgraph_store::{GraphSnapshot, SqliteStore};

/// Snapshot the store and write it to `path`, creating parent directories.
pub fn write_report(store: &SqliteStore, path: &Path) -> Result<GraphSnapshot> {
    let snapshot = store.snapshot_stats()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json)?;
    info!("Report written to {}", path.display());
    Ok(snapshot)
}
