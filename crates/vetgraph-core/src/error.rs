//! Error types for VetGraph.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A drug record is malformed or lacks a required field.
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Connection or transaction failure in the graph store.
    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
