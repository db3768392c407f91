//! Structured drug records as produced by the preprocessing step.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vetgraph_core::{Error, Result};
use vetgraph_store::DrugProperties;

/// One drug entry. Field names follow the source monograph columns, with
/// short aliases for hand-written records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrugRecord {
    #[serde(rename = "Medicine Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Uses/Indications", alias = "uses", default)]
    pub uses: Option<String>,
    #[serde(
        rename = "Contraindications/Precautions/Warnings",
        alias = "contraindications",
        default
    )]
    pub contraindications: Option<String>,
    #[serde(rename = "Adverse Effects", alias = "adverse_effects", default)]
    pub adverse_effects: Option<String>,
    #[serde(rename = "Storage/Stability", alias = "storage", default)]
    pub storage: Option<String>,
    #[serde(rename = "Doses", alias = "dosage", default)]
    pub dosage: Option<String>,
    /// Other drug names, separated by commas or semicolons.
    #[serde(rename = "Drug Interactions", alias = "interactions", default)]
    pub interactions: Option<String>,
}

impl DrugRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Drug node attributes, with missing fields as empty strings.
    pub fn properties(&self) -> DrugProperties {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        DrugProperties {
            name: self.name.as_deref().unwrap_or("").trim().to_string(),
            uses: field(&self.uses),
            contraindications: field(&self.contraindications),
            adverse_effects: field(&self.adverse_effects),
            storage: field(&self.storage),
        }
    }

    pub fn dosage_text(&self) -> &str {
        self.dosage.as_deref().unwrap_or("")
    }

    /// Distinct interacting drug names, excluding the drug itself.
    pub fn interaction_names(&self) -> Vec<String> {
        let own = self.name.as_deref().unwrap_or("").trim();
        let mut names: Vec<String> = Vec::new();
        for part in self.interactions.as_deref().unwrap_or("").split([',', ';']) {
            let part = part.trim();
            if part.is_empty() || part.eq_ignore_ascii_case(own) {
                continue;
            }
            if !names.iter().any(|n| n.eq_ignore_ascii_case(part)) {
                names.push(part.to_string());
            }
        }
        names
    }
}

/// Read records from a JSON file holding one record or an array of records.
///
/// Entries that do not deserialize as a record are logged and skipped.
pub fn load_records(path: &Path) -> Result<Vec<DrugRecord>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let entries = match value {
        serde_json::Value::Array(items) => items,
        obj @ serde_json::Value::Object(_) => vec![obj],
        other => {
            return Err(Error::Ingest(format!(
                "{} holds neither a record nor a list of records (found {})",
                path.display(),
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<DrugRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed record #{} in {}: {}", i, path.display(), e),
        }
    }
    info!("Loaded {} drug records from {}", records.len(), path.display());
    Ok(records)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
