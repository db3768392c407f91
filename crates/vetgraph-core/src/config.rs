//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Paths to all VetGraph data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Graph database directory (`data/graph/`).
    pub graph_db: PathBuf,
    /// Generated reports (`data/reports/`).
    pub reports: PathBuf,
    /// Default import input (`data/drug_data.json`).
    pub drug_data: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            graph_db: root.join("graph"),
            reports: root.join("reports"),
            drug_data: root.join("drug_data.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.graph_db)?;
        std::fs::create_dir_all(&self.reports)?;
        Ok(())
    }

    /// Default location of the stats report.
    pub fn default_report(&self) -> PathBuf {
        self.reports.join("kg_report.json")
    }
}

/// Top-level VetGraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VetGraphConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Louvain resolution; larger values yield smaller communities.
    pub community_resolution: f64,
}

impl VetGraphConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {}", p)))?,
            Err(_) => 5000,
        };

        let community_resolution = match std::env::var("VETGRAPH_RESOLUTION") {
            Ok(r) => parse_resolution(&r)?,
            Err(_) => 1.0,
        };

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            community_resolution,
        })
    }
}

fn parse_resolution(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(r) if r.is_finite() && r > 0.0 => Ok(r),
        _ => Err(Error::Config(format!(
            "VETGRAPH_RESOLUTION must be a positive number, got {:?}",
            raw
        ))),
    }
}
