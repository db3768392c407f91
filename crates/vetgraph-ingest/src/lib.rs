//! VetGraph Ingest: structured drug records → Drug nodes and typed relationships.

pub mod ingest;
pub mod record;

pub use ingest::{BatchReport, GraphIngestor, IngestOutcome, IngestedDrug, StepFailure};
pub use record::{load_records, DrugRecord};
