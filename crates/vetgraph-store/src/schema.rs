//! Database schema SQL.

/// Node and edge tables.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    key TEXT NOT NULL,
    props_json TEXT NOT NULL DEFAULT '{}',
    community INTEGER
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    rel_type TEXT NOT NULL,
    target_id INTEGER NOT NULL REFERENCES nodes(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_nodes_key ON nodes(key);
CREATE INDEX IF NOT EXISTS idx_nodes_community ON nodes(community);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
"#;

/// Uniqueness constraints backing node and edge upserts.
///
/// One node per (label, key) covers `Drug.name`, `Animal.name`,
/// `Symptom.name`, `Condition.name` and the other attribute labels.
pub const CONSTRAINTS_SQL: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS uq_nodes_label_key ON nodes(label, key);
CREATE UNIQUE INDEX IF NOT EXISTS uq_edges_source_rel_target ON edges(source_id, rel_type, target_id);
"#;
