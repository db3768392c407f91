//! Data types for graph nodes, relationships, templates and stats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a free-text value used as a node key.
pub const MAX_KEY_CHARS: usize = 100;

/// Cut a free-text value down to a node key.
///
/// Two texts sharing the same first 100 characters map to the same key and
/// therefore the same target node.
pub fn truncate_key(text: &str) -> &str {
    match text.char_indices().nth(MAX_KEY_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Node labels in the drug graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Drug,
    Condition,
    Contraindication,
    Effect,
    Dosage,
    Animal,
    Symptom,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 7] = [
        NodeLabel::Drug,
        NodeLabel::Condition,
        NodeLabel::Contraindication,
        NodeLabel::Effect,
        NodeLabel::Dosage,
        NodeLabel::Animal,
        NodeLabel::Symptom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drug => "Drug",
            Self::Condition => "Condition",
            Self::Contraindication => "Contraindication",
            Self::Effect => "Effect",
            Self::Dosage => "Dosage",
            Self::Animal => "Animal",
            Self::Symptom => "Symptom",
        }
    }

    /// Property that carries the identifying key.
    pub fn key_property(&self) -> &'static str {
        match self {
            Self::Dosage => "description",
            _ => "name",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drug-centric relationship types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelType {
    Treats,
    ContraindicatedFor,
    HasSideEffect,
    HasDosage,
    InteractsWith,
}

impl RelType {
    pub const ALL: [RelType; 5] = [
        RelType::Treats,
        RelType::ContraindicatedFor,
        RelType::HasSideEffect,
        RelType::HasDosage,
        RelType::InteractsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Treats => "TREATS",
            Self::ContraindicatedFor => "CONTRAINDICATED_FOR",
            Self::HasSideEffect => "HAS_SIDE_EFFECT",
            Self::HasDosage => "HAS_DOSAGE",
            Self::InteractsWith => "INTERACTS_WITH",
        }
    }

    /// Label of the node on the far side of the edge.
    pub fn target_label(&self) -> NodeLabel {
        match self {
            Self::Treats => NodeLabel::Condition,
            Self::ContraindicatedFor => NodeLabel::Contraindication,
            Self::HasSideEffect => NodeLabel::Effect,
            Self::HasDosage => NodeLabel::Dosage,
            Self::InteractsWith => NodeLabel::Drug,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for RelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (label, key) handle to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: String,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: impl Into<String>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }

    pub fn drug(name: impl Into<String>) -> Self {
        Self::new(NodeLabel::Drug, name)
    }
}

/// Normalized drug attributes written by `upsert_drug`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugProperties {
    pub name: String,
    pub uses: String,
    pub contraindications: String,
    pub adverse_effects: String,
    pub storage: String,
}

/// A node row from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: i64,
    pub label: NodeLabel,
    pub key: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<i64>,
}

/// A (source, target, type) triple as read by a relationship scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub rel_type: RelType,
}

/// Restricts a scan to some values, or lets everything through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    Any,
    Only(Vec<T>),
}

/// Filter on both endpoint labels of a relationship.
pub type NodeFilter = Filter<NodeLabel>;
/// Filter on relationship type.
pub type EdgeFilter = Filter<RelType>;

/// Fixed parameterized read templates, one per query intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// Drug uses plus linked dosage.
    Usage,
    /// Adverse-effects text plus linked Effect nodes.
    SideEffects,
    /// Contraindications text plus linked Contraindication nodes.
    Contraindications,
    /// Drugs linked by INTERACTS_WITH in either direction.
    Interactions,
    /// Storage text.
    Storage,
    /// The whole Drug record.
    General,
}

/// Structured result of a read template. Empty when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalRecord(serde_json::Map<String, serde_json::Value>);

impl RetrievalRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, field: &str, value: impl Into<serde_json::Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// A string field, treating blank text as absent.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// A list-of-strings field; missing or non-list yields an empty list.
    pub fn get_list(&self, field: &str) -> Vec<&str> {
        self.0
            .get(field)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RetrievalRecord {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// Read-only aggregation over the store for the reporting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub node_counts_by_label: BTreeMap<String, i64>,
    pub relationship_counts_by_type: BTreeMap<String, i64>,
    /// Community id → number of nodes carrying it.
    pub community_sizes: BTreeMap<i64, i64>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_key_counts_chars() {
        let short = "Diabetes management";
        assert_eq!(truncate_key(short), short);

        let long = "é".repeat(150);
        let key = truncate_key(&long);
        assert_eq!(key.chars().count(), MAX_KEY_CHARS);
        assert!(long.starts_with(key));
    }

    #[test]
    fn test_label_and_rel_round_trip_names() {
        for label in NodeLabel::ALL {
            assert_eq!(NodeLabel::parse(label.as_str()), Some(label));
        }
        for rel in RelType::ALL {
            assert_eq!(RelType::parse(rel.as_str()), Some(rel));
        }
        assert_eq!(NodeLabel::Dosage.key_property(), "description");
        assert_eq!(RelType::HasDosage.target_label(), NodeLabel::Dosage);
    }

    #[test]
    fn test_record_accessors() {
        let mut record = RetrievalRecord::empty();
        assert!(record.is_empty());
        record.insert("storage", "Store below 25C");
        record.insert("blank", "  ");
        record.insert("effects", serde_json::json!(["nausea", "bloating"]));

        assert_eq!(record.get_str("storage"), Some("Store below 25C"));
        assert_eq!(record.get_str("blank"), None);
        assert_eq!(record.get_list("effects"), vec!["nausea", "bloating"]);
        assert!(record.get_list("storage").is_empty());
    }
}
