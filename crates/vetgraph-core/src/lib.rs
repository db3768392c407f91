//! VetGraph Core: error kinds, configuration, data directories.

pub mod config;
pub mod error;

pub use config::{DataPaths, VetGraphConfig};
pub use error::{Error, Result};
