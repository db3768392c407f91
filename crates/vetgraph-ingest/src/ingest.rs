//! Drug ingestion pipeline: record → Drug node → attribute edges.

use std::time::Instant;

use serde::Serialize;
use serde_json::Map;
use tracing::{debug, info, warn};

use crate::record::DrugRecord;
use vetgraph_core::Result;
use vetgraph_store::{truncate_key, NodeRef, RelType, SqliteStore};

/// Turns drug records into graph writes. Safe to re-run over the same input.
pub struct GraphIngestor<'a> {
    store: &'a SqliteStore,
}

/// A relationship step that failed while the rest of the record went in.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub rel_type: RelType,
    pub reason: String,
}

/// Result of ingesting one record.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedDrug {
    pub name: String,
    /// Relationship types now linked from the drug.
    pub linked: Vec<RelType>,
    pub skipped: Vec<StepFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    Success(IngestedDrug),
    Failure { name: Option<String>, reason: String },
}

impl IngestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Per-record outcomes of a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<IngestOutcome>,
    pub duration_ms: u128,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

impl<'a> GraphIngestor<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Ingest one record.
    ///
    /// The Drug node is written first; a record without a name fails here
    /// with nothing written. Each relationship step after that is
    /// independent: a failing step is logged and skipped.
    pub fn ingest(&self, record: &DrugRecord) -> Result<IngestedDrug> {
        let props = record.properties();
        self.store.upsert_drug(&props)?;

        let drug = NodeRef::drug(props.name.as_str());
        let mut result = IngestedDrug {
            name: props.name.clone(),
            linked: Vec::new(),
            skipped: Vec::new(),
        };

        let steps = [
            (RelType::Treats, props.uses.as_str()),
            (RelType::ContraindicatedFor, props.contraindications.as_str()),
            (RelType::HasSideEffect, props.adverse_effects.as_str()),
            (RelType::HasDosage, record.dosage_text()),
        ];
        for (rel, text) in steps {
            match self.link_attribute(&drug, rel, text) {
                Ok(true) => result.linked.push(rel),
                Ok(false) => {}
                Err(e) => {
                    warn!("Skipping {} for {}: {}", rel, props.name, e);
                    result.skipped.push(StepFailure {
                        rel_type: rel,
                        reason: e.to_string(),
                    });
                }
            }
        }

        match self.link_interactions(&drug, &record.interaction_names()) {
            Ok(true) => result.linked.push(RelType::InteractsWith),
            Ok(false) => {}
            Err(e) => {
                warn!("Skipping interactions for {}: {}", props.name, e);
                result.skipped.push(StepFailure {
                    rel_type: RelType::InteractsWith,
                    reason: e.to_string(),
                });
            }
        }

        info!("Imported drug: {}", props.name);
        Ok(result)
    }

    /// Point the drug's single `rel` edge at the node keyed by `text`.
    /// Blank text removes the edge instead. Returns whether an edge exists.
    fn link_attribute(&self, drug: &NodeRef, rel: RelType, text: &str) -> Result<bool> {
        if text.trim().is_empty() {
            self.store.replace_relationship(drug, rel, None, &Map::new())?;
            return Ok(false);
        }
        let target = NodeRef::new(rel.target_label(), truncate_key(text));
        self.store
            .replace_relationship(drug, rel, Some(&target), &Map::new())?;
        Ok(true)
    }

    /// Replace the drug's outgoing INTERACTS_WITH edges with `names`.
    /// Names resolve to existing drugs ignoring case; unknown drugs are
    /// created with just a name.
    fn link_interactions(&self, drug: &NodeRef, names: &[String]) -> Result<bool> {
        self.store
            .replace_relationship(drug, RelType::InteractsWith, None, &Map::new())?;
        for name in names {
            let key = self
                .store
                .resolve_drug_key(name)?
                .unwrap_or_else(|| name.clone());
            self.store.upsert_relationship(
                drug,
                RelType::InteractsWith,
                &NodeRef::drug(key),
                &Map::new(),
            )?;
        }
        Ok(!names.is_empty())
    }

    /// Ingest records in order. One record failing never stops the rest.
    pub fn ingest_batch<'r>(
        &self,
        records: impl IntoIterator<Item = &'r DrugRecord>,
    ) -> BatchReport {
        let start = Instant::now();
        let mut report = BatchReport::default();

        for record in records {
            let outcome = match self.ingest(record) {
                Ok(drug) => IngestOutcome::Success(drug),
                Err(e) => {
                    warn!(
                        "Error importing drug {}: {}",
                        record.name.as_deref().unwrap_or("<unnamed>"),
                        e
                    );
                    IngestOutcome::Failure {
                        name: record.name.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        report.duration_ms = start.elapsed().as_millis();
        info!(
            "Ingested {} drugs ({} failed) in {}ms",
            report.succeeded(),
            report.failed(),
            report.duration_ms
        );
        report
    }

    /// Wipe the graph and ingest `records` into a fresh one.
    pub fn reimport(&self, records: &[DrugRecord]) -> Result<BatchReport> {
        self.store.clear_all()?;
        self.store.ensure_constraints()?;
        debug!("Graph cleared for reimport of {} records", records.len());
        Ok(self.ingest_batch(records))
    }
}
