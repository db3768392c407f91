//! SQLite-backed property graph store.
//!
//! Nodes are unique per (label, key) and edges per (source, type, target),
//! so every write is an upsert. Each mutating call runs in its own
//! transaction; a failure rolls back that call only.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::scan::RelationshipScan;
use crate::schema::{CONSTRAINTS_SQL, SCHEMA_SQL};
use crate::types::*;
use vetgraph_core::{Error, Result};

/// Property graph persisted in a single SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

type NodeParts = (i64, String, String, String, Option<i64>);

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/graph/`). The file will be `db_dir/vetgraph.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Store(e.to_string()))?;
        let db_path = db_dir.join("vetgraph.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Store(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_constraints()?;

        info!(
            "SqliteStore initialized: {} nodes, {} edges, path={}",
            store.count_nodes(None)?,
            store.count_edges(None)?,
            db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Store(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Store(e.to_string()))?;
        Ok(conn)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Declare the uniqueness constraints. Safe to call any number of times.
    pub fn ensure_constraints(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(CONSTRAINTS_SQL)
            .map_err(|e| Error::Store(format!("Constraint setup failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Create or update a Drug node's attributes. Returns the node ID.
    ///
    /// Attributes are overwritten; the community label is left alone.
    pub fn upsert_drug(&self, drug: &DrugProperties) -> Result<i64> {
        let name = drug.name.trim();
        if name.is_empty() {
            return Err(Error::Ingest("drug record has no name".into()));
        }

        let mut props = Map::new();
        props.insert("uses".into(), Value::String(drug.uses.clone()));
        props.insert(
            "contraindications".into(),
            Value::String(drug.contraindications.clone()),
        );
        props.insert(
            "adverse_effects".into(),
            Value::String(drug.adverse_effects.clone()),
        );
        props.insert("storage".into(), Value::String(drug.storage.clone()));

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Store(e.to_string()))?;
        let id = Self::upsert_node(&tx, &NodeRef::drug(name), &props)?;
        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(id)
    }

    /// Link `from` to `to` with `rel`, creating the target if absent.
    ///
    /// No-op when the target already exists with the same attributes and the
    /// edge is already present.
    pub fn upsert_relationship(
        &self,
        from: &NodeRef,
        rel: RelType,
        to: &NodeRef,
        to_attrs: &Map<String, Value>,
    ) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Store(e.to_string()))?;
        Self::link(&tx, from, rel, to, to_attrs)?;
        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(())
    }

    /// Make `to` the only target of `from`'s outgoing `rel` edges.
    ///
    /// With `to = None` all such edges are removed. Returns the number of
    /// edges dropped. Target nodes left without edges are kept.
    pub fn replace_relationship(
        &self,
        from: &NodeRef,
        rel: RelType,
        to: Option<&NodeRef>,
        to_attrs: &Map<String, Value>,
    ) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Store(e.to_string()))?;

        let source_id = Self::require_node(&tx, from)?;
        let keep = match to {
            Some(target) => Some(Self::link(&tx, from, rel, target, to_attrs)?),
            None => None,
        };
        let removed = tx
            .execute(
                "DELETE FROM edges WHERE source_id = ?1 AND rel_type = ?2 AND target_id IS NOT ?3",
                params![source_id, rel.as_str(), keep],
            )
            .map_err(|e| Error::Store(e.to_string()))?;

        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        if removed > 0 {
            debug!("Dropped {} stale {} edges from {}", removed, rel, from.key);
        }
        Ok(removed)
    }

    /// Set the community label on every node whose key is `key`.
    pub fn set_community(&self, key: &str, community: i64) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Store(e.to_string()))?;
        let count = tx
            .execute(
                "UPDATE nodes SET community = ?2 WHERE key = ?1",
                params![key, community],
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        Ok(count)
    }

    /// Delete every node and edge. Constraints stay in place.
    pub fn clear_all(&self) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Store(e.to_string()))?;
        tx.execute_batch("DELETE FROM edges; DELETE FROM nodes;")
            .map_err(|e| Error::Store(e.to_string()))?;
        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        info!("Cleared all nodes and edges");
        Ok(())
    }

    fn upsert_node(tx: &Transaction<'_>, node: &NodeRef, attrs: &Map<String, Value>) -> Result<i64> {
        let mut props = attrs.clone();
        props.insert(
            node.label.key_property().to_string(),
            Value::String(node.key.clone()),
        );
        let props_json = serde_json::to_string(&props)?;

        tx.prepare_cached(
            "INSERT INTO nodes (label, key, props_json) VALUES (?1, ?2, ?3) \
             ON CONFLICT(label, key) DO UPDATE \
             SET props_json = json_patch(nodes.props_json, excluded.props_json) \
             WHERE nodes.props_json IS NOT json_patch(nodes.props_json, excluded.props_json)",
        )
        .map_err(|e| Error::Store(e.to_string()))?
        .execute(params![node.label.as_str(), node.key, props_json])
        .map_err(|e| Error::Store(e.to_string()))?;

        Self::find_node_id(tx, node)?
            .ok_or_else(|| Error::Internal(format!("{} {:?} vanished after upsert", node.label, node.key)))
    }

    fn link(
        tx: &Transaction<'_>,
        from: &NodeRef,
        rel: RelType,
        to: &NodeRef,
        to_attrs: &Map<String, Value>,
    ) -> Result<i64> {
        if to.label != rel.target_label() {
            return Err(Error::Ingest(format!(
                "{} must point at {}, not {}",
                rel,
                rel.target_label(),
                to.label
            )));
        }
        let source_id = Self::require_node(tx, from)?;
        let target_id = Self::upsert_node(tx, to, to_attrs)?;

        tx.prepare_cached(
            "INSERT INTO edges (source_id, rel_type, target_id) VALUES (?1, ?2, ?3) \
             ON CONFLICT(source_id, rel_type, target_id) DO NOTHING",
        )
        .map_err(|e| Error::Store(e.to_string()))?
        .execute(params![source_id, rel.as_str(), target_id])
        .map_err(|e| Error::Store(e.to_string()))?;

        Ok(target_id)
    }

    fn find_node_id(conn: &Connection, node: &NodeRef) -> Result<Option<i64>> {
        conn.prepare_cached("SELECT id FROM nodes WHERE label = ?1 AND key = ?2")
            .map_err(|e| Error::Store(e.to_string()))?
            .query_row(params![node.label.as_str(), node.key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Store(e.to_string()))
    }

    fn require_node(conn: &Connection, node: &NodeRef) -> Result<i64> {
        Self::find_node_id(conn, node)?.ok_or_else(|| {
            Error::Ingest(format!("{} {:?} does not exist", node.label, node.key))
        })
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Lazily scan (source, target, type) triples, one page at a time.
    pub fn read_all(&self, nodes: &NodeFilter, edges: &EdgeFilter) -> RelationshipScan<'_> {
        RelationshipScan::new(self, nodes, edges)
    }

    /// Run a read template for one drug. Empty record when the drug is unknown.
    pub fn run_template(&self, template: Template, drug_name: &str) -> Result<RetrievalRecord> {
        let conn = self.conn.lock();
        let drug = match Self::find_drug(&conn, drug_name)? {
            Some(d) => d,
            None => {
                debug!("No drug matches {:?}", drug_name);
                return Ok(RetrievalRecord::empty());
            }
        };

        let text = |field: &str| {
            drug.properties
                .get(field)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        };

        let mut record = RetrievalRecord::empty();
        match template {
            Template::Usage => {
                record.insert("uses", text("uses"));
                let dosage = Self::linked_keys(&conn, drug.id, RelType::HasDosage)?
                    .into_iter()
                    .next();
                record.insert("dosage", dosage.map(Value::String).unwrap_or(Value::Null));
            }
            Template::SideEffects => {
                record.insert("effects", text("adverse_effects"));
                record.insert(
                    "specific_effects",
                    Self::linked_keys(&conn, drug.id, RelType::HasSideEffect)?,
                );
            }
            Template::Contraindications => {
                record.insert("warnings", text("contraindications"));
                record.insert(
                    "specific_contraindications",
                    Self::linked_keys(&conn, drug.id, RelType::ContraindicatedFor)?,
                );
            }
            Template::Interactions => {
                record.insert("interacting_drugs", Self::interacting_drugs(&conn, drug.id)?);
            }
            Template::Storage => {
                record.insert("storage", text("storage"));
            }
            Template::General => {
                record.insert("name", drug.key.clone());
                for field in ["uses", "contraindications", "adverse_effects", "storage"] {
                    record.insert(field, text(field));
                }
                if let Some(community) = drug.community {
                    record.insert("community", community);
                }
            }
        }
        Ok(record)
    }

    /// Exact name match first, then case-insensitive.
    fn find_drug(conn: &Connection, name: &str) -> Result<Option<GraphNode>> {
        let parts = conn
            .prepare_cached(
                "SELECT id, label, key, props_json, community FROM nodes \
                 WHERE label = 'Drug' AND key = ?1 COLLATE NOCASE \
                 ORDER BY (key = ?1) DESC, id LIMIT 1",
            )
            .map_err(|e| Error::Store(e.to_string()))?
            .query_row(params![name.trim()], Self::row_to_parts)
            .optional()
            .map_err(|e| Error::Store(e.to_string()))?;
        parts.map(Self::node_from_parts).transpose()
    }

    fn linked_keys(conn: &Connection, source_id: i64, rel: RelType) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT t.key FROM edges e JOIN nodes t ON t.id = e.target_id \
                 WHERE e.source_id = ?1 AND e.rel_type = ?2 AND t.label = ?3 \
                 ORDER BY t.key",
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![source_id, rel.as_str(), rel.target_label().as_str()],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(e.to_string()))
    }

    /// INTERACTS_WITH is stored directed but read in both directions.
    fn interacting_drugs(conn: &Connection, drug_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT DISTINCT o.key FROM edges e \
                 JOIN nodes o ON o.id = CASE WHEN e.source_id = ?1 THEN e.target_id ELSE e.source_id END \
                 WHERE e.rel_type = 'INTERACTS_WITH' \
                   AND (e.source_id = ?1 OR e.target_id = ?1) \
                   AND o.label = 'Drug' AND o.id != ?1 \
                 ORDER BY o.key",
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map(params![drug_id], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Store(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(e.to_string()))
    }

    /// Get a node by label and key.
    pub fn get_node(&self, node: &NodeRef) -> Result<Option<GraphNode>> {
        let conn = self.conn.lock();
        let parts = conn
            .prepare_cached(
                "SELECT id, label, key, props_json, community FROM nodes WHERE label = ?1 AND key = ?2",
            )
            .map_err(|e| Error::Store(e.to_string()))?
            .query_row(params![node.label.as_str(), node.key], Self::row_to_parts)
            .optional()
            .map_err(|e| Error::Store(e.to_string()))?;
        parts.map(Self::node_from_parts).transpose()
    }

    /// Stored key of the Drug matching `name`, exactly or ignoring case.
    pub fn resolve_drug_key(&self, name: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        Ok(Self::find_drug(&conn, name)?.map(|node| node.key))
    }

    /// All keys for a label, sorted.
    pub fn node_keys(&self, label: NodeLabel) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT key FROM nodes WHERE label = ?1 ORDER BY key")
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map(params![label.as_str()], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Store(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(e.to_string()))
    }

    /// Target keys of `from`'s outgoing `rel` edges.
    pub fn outgoing(&self, from: &NodeRef, rel: RelType) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        match Self::find_node_id(&conn, from)? {
            Some(id) => Self::linked_keys(&conn, id, rel),
            None => Ok(Vec::new()),
        }
    }

    /// Count nodes, optionally restricted to one label.
    pub fn count_nodes(&self, label: Option<NodeLabel>) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = match label {
            Some(l) => conn.query_row(
                "SELECT COUNT(*) FROM nodes WHERE label = ?1",
                params![l.as_str()],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0)),
        }
        .map_err(|e| Error::Store(e.to_string()))?;
        Ok(count)
    }

    /// Count edges, optionally restricted to one type.
    pub fn count_edges(&self, rel: Option<RelType>) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = match rel {
            Some(r) => conn.query_row(
                "SELECT COUNT(*) FROM edges WHERE rel_type = ?1",
                params![r.as_str()],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0)),
        }
        .map_err(|e| Error::Store(e.to_string()))?;
        Ok(count)
    }

    /// Node counts per label, edge counts per type and community sizes.
    pub fn snapshot_stats(&self) -> Result<GraphSnapshot> {
        let conn = self.conn.lock();

        let node_counts_by_label = Self::grouped_counts::<String>(
            &conn,
            "SELECT label, COUNT(*) FROM nodes GROUP BY label",
        )?;
        let relationship_counts_by_type = Self::grouped_counts::<String>(
            &conn,
            "SELECT rel_type, COUNT(*) FROM edges GROUP BY rel_type",
        )?;
        let community_sizes = Self::grouped_counts::<i64>(
            &conn,
            "SELECT community, COUNT(*) FROM nodes WHERE community IS NOT NULL GROUP BY community",
        )?;

        Ok(GraphSnapshot {
            node_counts_by_label,
            relationship_counts_by_type,
            community_sizes,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    fn grouped_counts<K>(conn: &Connection, sql: &str) -> Result<BTreeMap<K, i64>>
    where
        K: rusqlite::types::FromSql + Ord,
    {
        let mut stmt = conn.prepare(sql).map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, K>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| Error::Store(e.to_string()))?;
        rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()
            .map_err(|e| Error::Store(e.to_string()))
    }

    fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodeParts> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn node_from_parts((id, label, key, props_json, community): NodeParts) -> Result<GraphNode> {
        let label = NodeLabel::parse(&label)
            .ok_or_else(|| Error::Store(format!("unknown node label {:?}", label)))?;
        let properties: Map<String, Value> = serde_json::from_str(&props_json)?;
        Ok(GraphNode {
            id,
            label,
            key,
            properties,
            community,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn acarbose() -> DrugProperties {
        DrugProperties {
            name: "Acarbose".into(),
            uses: "Diabetes management in dogs".into(),
            storage: "Store below 25C".into(),
            ..Default::default()
        }
    }

    fn no_attrs() -> Map<String, Value> {
        Map::new()
    }

    #[test]
    fn test_ensure_constraints_is_idempotent() {
        let (store, _dir) = test_store();
        store.ensure_constraints().unwrap();
        store.ensure_constraints().unwrap();
        store.upsert_drug(&acarbose()).unwrap();
        assert_eq!(store.count_nodes(Some(NodeLabel::Drug)).unwrap(), 1);
    }

    #[test]
    fn test_upsert_drug_twice_keeps_one_node() {
        let (store, _dir) = test_store();
        let first = store.upsert_drug(&acarbose()).unwrap();

        let mut updated = acarbose();
        updated.storage = "Refrigerate".into();
        let second = store.upsert_drug(&updated).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_nodes(Some(NodeLabel::Drug)).unwrap(), 1);
        let node = store.get_node(&NodeRef::drug("Acarbose")).unwrap().unwrap();
        assert_eq!(node.properties["storage"], "Refrigerate");
        assert_eq!(node.properties["name"], "Acarbose");
    }

    #[test]
    fn test_upsert_drug_without_name_is_ingest_error() {
        let (store, _dir) = test_store();
        let err = store.upsert_drug(&DrugProperties::default()).unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
        assert_eq!(store.count_nodes(None).unwrap(), 0);
    }

    #[test]
    fn test_upsert_drug_preserves_community() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        store.set_community("Acarbose", 3).unwrap();
        store.upsert_drug(&acarbose()).unwrap();
        let node = store.get_node(&NodeRef::drug("Acarbose")).unwrap().unwrap();
        assert_eq!(node.community, Some(3));
    }

    #[test]
    fn test_upsert_relationship_is_idempotent() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let drug = NodeRef::drug("Acarbose");
        let condition = NodeRef::new(NodeLabel::Condition, "Diabetes management in dogs");

        for _ in 0..3 {
            store
                .upsert_relationship(&drug, RelType::Treats, &condition, &no_attrs())
                .unwrap();
        }

        assert_eq!(store.count_nodes(Some(NodeLabel::Condition)).unwrap(), 1);
        assert_eq!(store.count_edges(Some(RelType::Treats)).unwrap(), 1);
    }

    #[test]
    fn test_upsert_relationship_requires_source() {
        let (store, _dir) = test_store();
        let err = store
            .upsert_relationship(
                &NodeRef::drug("Ghost"),
                RelType::Treats,
                &NodeRef::new(NodeLabel::Condition, "Anything"),
                &no_attrs(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
        // The failed call rolled back, so no orphan target was written.
        assert_eq!(store.count_nodes(None).unwrap(), 0);
    }

    #[test]
    fn test_upsert_relationship_rejects_wrong_target_label() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let err = store
            .upsert_relationship(
                &NodeRef::drug("Acarbose"),
                RelType::Treats,
                &NodeRef::new(NodeLabel::Effect, "Bloating"),
                &no_attrs(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
    }

    #[test]
    fn test_target_attributes_merge() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let drug = NodeRef::drug("Acarbose");
        let effect = NodeRef::new(NodeLabel::Effect, "Flatulence");

        let mut attrs = Map::new();
        attrs.insert("severity".into(), Value::String("mild".into()));
        store
            .upsert_relationship(&drug, RelType::HasSideEffect, &effect, &attrs)
            .unwrap();
        store
            .upsert_relationship(&drug, RelType::HasSideEffect, &effect, &no_attrs())
            .unwrap();

        let node = store.get_node(&effect).unwrap().unwrap();
        assert_eq!(node.properties["severity"], "mild");
        assert_eq!(node.properties["name"], "Flatulence");
    }

    #[test]
    fn test_replace_relationship_keeps_single_edge() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let drug = NodeRef::drug("Acarbose");
        let a = NodeRef::new(NodeLabel::Condition, "A");
        let b = NodeRef::new(NodeLabel::Condition, "B");

        store
            .replace_relationship(&drug, RelType::Treats, Some(&a), &no_attrs())
            .unwrap();
        let removed = store
            .replace_relationship(&drug, RelType::Treats, Some(&b), &no_attrs())
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.outgoing(&drug, RelType::Treats).unwrap(), vec!["B"]);
        // The old target survives as an isolated node.
        assert!(store.get_node(&a).unwrap().is_some());

        let removed = store
            .replace_relationship(&drug, RelType::Treats, None, &no_attrs())
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.outgoing(&drug, RelType::Treats).unwrap().is_empty());
    }

    #[test]
    fn test_dosage_nodes_keyed_by_description() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let dosage = NodeRef::new(NodeLabel::Dosage, "12.5 mg per dog with meals");
        store
            .upsert_relationship(&NodeRef::drug("Acarbose"), RelType::HasDosage, &dosage, &no_attrs())
            .unwrap();
        let node = store.get_node(&dosage).unwrap().unwrap();
        assert_eq!(node.properties["description"], "12.5 mg per dog with meals");
        assert!(node.properties.get("name").is_none());
    }

    #[test]
    fn test_run_template_storage_and_missing_drug() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();

        let record = store.run_template(Template::Storage, "Acarbose").unwrap();
        assert_eq!(record.get_str("storage"), Some("Store below 25C"));

        let record = store.run_template(Template::Storage, "Unknownamycin").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_run_template_case_insensitive_lookup() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let record = store.run_template(Template::General, "ACARBOSE").unwrap();
        assert_eq!(record.get_str("name"), Some("Acarbose"));
    }

    #[test]
    fn test_resolve_drug_key() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        assert_eq!(
            store.resolve_drug_key("acarbose").unwrap().as_deref(),
            Some("Acarbose")
        );
        assert_eq!(
            store.resolve_drug_key(" Acarbose ").unwrap().as_deref(),
            Some("Acarbose")
        );
        assert_eq!(store.resolve_drug_key("Digoxin").unwrap(), None);
    }

    #[test]
    fn test_run_template_linked_nodes() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let drug = NodeRef::drug("Acarbose");
        store
            .upsert_relationship(
                &drug,
                RelType::HasDosage,
                &NodeRef::new(NodeLabel::Dosage, "12.5 mg PO"),
                &no_attrs(),
            )
            .unwrap();
        store
            .upsert_relationship(
                &drug,
                RelType::HasSideEffect,
                &NodeRef::new(NodeLabel::Effect, "Diarrhea"),
                &no_attrs(),
            )
            .unwrap();

        let usage = store.run_template(Template::Usage, "Acarbose").unwrap();
        assert_eq!(usage.get_str("uses"), Some("Diabetes management in dogs"));
        assert_eq!(usage.get_str("dosage"), Some("12.5 mg PO"));

        let effects = store.run_template(Template::SideEffects, "Acarbose").unwrap();
        assert_eq!(effects.get_list("specific_effects"), vec!["Diarrhea"]);
        assert_eq!(effects.get_str("effects"), None);

        let warnings = store.run_template(Template::Contraindications, "Acarbose").unwrap();
        assert!(!warnings.is_empty());
        assert!(warnings.get_list("specific_contraindications").is_empty());
    }

    #[test]
    fn test_interactions_read_both_directions() {
        let (store, _dir) = test_store();
        for name in ["Acarbose", "Insulin", "Digoxin"] {
            store
                .upsert_drug(&DrugProperties {
                    name: name.into(),
                    ..Default::default()
                })
                .unwrap();
        }
        store
            .upsert_relationship(
                &NodeRef::drug("Acarbose"),
                RelType::InteractsWith,
                &NodeRef::drug("Digoxin"),
                &no_attrs(),
            )
            .unwrap();
        store
            .upsert_relationship(
                &NodeRef::drug("Insulin"),
                RelType::InteractsWith,
                &NodeRef::drug("Acarbose"),
                &no_attrs(),
            )
            .unwrap();

        let record = store.run_template(Template::Interactions, "Acarbose").unwrap();
        assert_eq!(record.get_list("interacting_drugs"), vec!["Digoxin", "Insulin"]);
    }

    #[test]
    fn test_set_community_and_snapshot() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        let drug = NodeRef::drug("Acarbose");
        store
            .upsert_relationship(
                &drug,
                RelType::Treats,
                &NodeRef::new(NodeLabel::Condition, "Diabetes"),
                &no_attrs(),
            )
            .unwrap();
        store.set_community("Acarbose", 0).unwrap();
        store.set_community("Diabetes", 0).unwrap();

        let snapshot = store.snapshot_stats().unwrap();
        assert_eq!(snapshot.node_counts_by_label["Drug"], 1);
        assert_eq!(snapshot.node_counts_by_label["Condition"], 1);
        assert_eq!(snapshot.relationship_counts_by_type["TREATS"], 1);
        assert_eq!(snapshot.community_sizes[&0], 2);
        assert!(!snapshot.timestamp.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let (store, _dir) = test_store();
        store.upsert_drug(&acarbose()).unwrap();
        store
            .upsert_relationship(
                &NodeRef::drug("Acarbose"),
                RelType::Treats,
                &NodeRef::new(NodeLabel::Condition, "Diabetes"),
                &no_attrs(),
            )
            .unwrap();

        store.clear_all().unwrap();
        assert_eq!(store.count_nodes(None).unwrap(), 0);
        assert_eq!(store.count_edges(None).unwrap(), 0);

        // Constraints survive the wipe.
        store.upsert_drug(&acarbose()).unwrap();
        store.upsert_drug(&acarbose()).unwrap();
        assert_eq!(store.count_nodes(None).unwrap(), 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SqliteStore::open(dir.path()).unwrap();
            store.upsert_drug(&acarbose()).unwrap();
        }
        let store = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(store.node_keys(NodeLabel::Drug).unwrap(), vec!["Acarbose"]);
    }
}
