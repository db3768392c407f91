//! VetGraph Server: thin HTTP and CLI shims over ingestion, community
//! detection and question answering.

pub mod report;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
