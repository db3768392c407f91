//! VetGraph Query: free-text question → intent + entities → graph read → answer text.

pub mod classify;
pub mod engine;
pub mod retrieve;
pub mod synthesize;
pub mod types;

pub use classify::{classify_intent, QueryClassifier};
pub use engine::QueryEngine;
pub use retrieve::RetrievalRouter;
pub use synthesize::{synthesize, APOLOGY, NOT_FOUND};
pub use types::{Answer, Classification, Entities, Intent};
