//! Lazy relationship scan for community projection.
//!
//! Pages through the edge table by id, taking the connection lock once per
//! page. Finite and single-pass: once exhausted (or after an error) it
//! yields nothing further.

use std::collections::VecDeque;

use rusqlite::params;

use crate::sqlite::SqliteStore;
use crate::types::*;
use vetgraph_core::{Error, Result};

const DEFAULT_PAGE_SIZE: usize = 512;

pub struct RelationshipScan<'a> {
    store: &'a SqliteStore,
    sql: String,
    last_id: i64,
    page_size: usize,
    buffer: VecDeque<Relationship>,
    done: bool,
}

impl<'a> RelationshipScan<'a> {
    pub(crate) fn new(store: &'a SqliteStore, nodes: &NodeFilter, edges: &EdgeFilter) -> Self {
        Self {
            store,
            sql: build_sql(nodes, edges),
            last_id: 0,
            page_size: DEFAULT_PAGE_SIZE,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Override how many edges are fetched per lock.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn fetch_page(&mut self) -> Result<()> {
        let store = self.store;
        let conn = store.lock();
        let mut stmt = conn
            .prepare_cached(&self.sql)
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map(params![self.last_id, self.page_size as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| Error::Store(e.to_string()))?;

        let mut fetched = 0;
        for row in rows {
            let (id, source, target, rel) = row.map_err(|e| Error::Store(e.to_string()))?;
            let rel_type = RelType::parse(&rel)
                .ok_or_else(|| Error::Store(format!("unknown relationship type {:?}", rel)))?;
            self.last_id = id;
            self.buffer.push_back(Relationship {
                source,
                target,
                rel_type,
            });
            fetched += 1;
        }

        if fetched < self.page_size {
            self.done = true;
        }
        Ok(())
    }
}

impl Iterator for RelationshipScan<'_> {
    type Item = Result<Relationship>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(rel) = self.buffer.pop_front() {
            return Some(Ok(rel));
        }
        if self.done {
            return None;
        }
        match self.fetch_page() {
            Ok(()) => {
                let next = self.buffer.pop_front();
                if next.is_none() {
                    self.done = true;
                }
                next.map(Ok)
            }
            Err(e) => {
                self.done = true;
                self.buffer.clear();
                Some(Err(e))
            }
        }
    }
}

fn in_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filter values come from the label/type enums, so inlining them is safe.
fn build_sql(nodes: &NodeFilter, edges: &EdgeFilter) -> String {
    let mut sql = String::from(
        "SELECT e.id, s.key, t.key, e.rel_type FROM edges e \
         JOIN nodes s ON s.id = e.source_id \
         JOIN nodes t ON t.id = e.target_id \
         WHERE e.id > ?1",
    );
    if let Filter::Only(labels) = nodes {
        let list = in_list(labels.iter().map(|l| l.as_str()));
        sql.push_str(&format!(" AND s.label IN ({list}) AND t.label IN ({list})"));
    }
    if let Filter::Only(types) = edges {
        let list = in_list(types.iter().map(|r| r.as_str()));
        sql.push_str(&format!(" AND e.rel_type IN ({list})"));
    }
    sql.push_str(" ORDER BY e.id LIMIT ?2");
    sql
}
