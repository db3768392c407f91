//! Retrieval record → answer text. Fields are copied verbatim.

use crate::types::Intent;
use vetgraph_store::RetrievalRecord;

pub const NOT_FOUND: &str =
    "I'm sorry, I couldn't find information about that drug. Could you please verify the drug name?";

/// Shown instead of any internal error.
pub const APOLOGY: &str = "I'm sorry, I encountered an error processing your query.";

/// Format an answer. An empty record always yields [`NOT_FOUND`].
pub fn synthesize(intent: Intent, record: &RetrievalRecord) -> String {
    if record.is_empty() {
        return NOT_FOUND.to_string();
    }
    match intent {
        Intent::Usage => usage(record),
        Intent::SideEffects => section(
            record.get_str("effects"),
            "Potential side effects:",
            "I couldn't find specific side effect information for this drug.",
        ),
        Intent::Contraindications => section(
            record.get_str("warnings"),
            "Important warnings and contraindications:",
            "I couldn't find specific contraindication information for this drug.",
        ),
        Intent::Interactions => interactions(record),
        Intent::Storage => section(
            record.get_str("storage"),
            "Storage instructions:",
            "I couldn't find specific storage information for this drug.",
        ),
        Intent::General => general(record),
    }
}

fn section(body: Option<&str>, heading: &str, fallback: &str) -> String {
    match body {
        Some(text) => format!("{heading}\n{text}"),
        None => fallback.to_string(),
    }
}

fn usage(record: &RetrievalRecord) -> String {
    let mut parts = Vec::new();
    if let Some(uses) = record.get_str("uses") {
        parts.push(format!("Usage Information:\n{uses}"));
    }
    if let Some(dosage) = record.get_str("dosage") {
        parts.push(format!("\nDosage Instructions:\n{dosage}"));
    }
    if parts.is_empty() {
        return "I couldn't find specific usage information for this drug.".to_string();
    }
    parts.join("\n")
}

fn interactions(record: &RetrievalRecord) -> String {
    let drugs = record.get_list("interacting_drugs");
    if drugs.is_empty() {
        return "No specific drug interaction information found.".to_string();
    }
    format!("This drug may interact with: {}", drugs.join(", "))
}

fn general(record: &RetrievalRecord) -> String {
    const FIELDS: [(&str, &str); 5] = [
        ("name", "Name"),
        ("uses", "Uses"),
        ("contraindications", "Contraindications"),
        ("adverse_effects", "Adverse effects"),
        ("storage", "Storage"),
    ];

    let mut lines: Vec<String> = FIELDS
        .iter()
        .filter_map(|&(field, label)| record.get_str(field).map(|v| format!("{label}: {v}")))
        .collect();
    if let Some(community) = record.get("community").and_then(|v| v.as_i64()) {
        lines.push(format!("Community: {community}"));
    }

    if lines.is_empty() {
        return "I couldn't find general information about this drug.".to_string();
    }
    format!("Here's what I know about this drug:\n{}", lines.join("\n"))
}
