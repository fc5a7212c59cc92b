use std::path::Path;

use rusqlite::{Connection, params, params_from_iter};

use crate::{
    errors::ClosureGraphError,
    finder::{Finder, TripleIter},
    node::{Node, Triple, TriplePattern, validate_node, validate_pattern},
    schema::ensure_schema,
};

pub struct SqliteFactStore {
    conn: Connection,
}

impl SqliteFactStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClosureGraphError> {
        Self::with_connection(Connection::open(path))
    }

    pub fn open_in_memory() -> Result<Self, ClosureGraphError> {
        Self::with_connection(Connection::open_in_memory())
    }

    fn with_connection(conn: rusqlite::Result<Connection>) -> Result<Self, ClosureGraphError> {
        let conn = conn.map_err(|e| ClosureGraphError::connection(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn insert(&self, triple: &Triple) -> Result<bool, ClosureGraphError> {
        validate_triple(triple)?;
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO facts(subject, predicate, object) VALUES(?1, ?2, ?3)",
                params![
                    triple.subject.as_str(),
                    triple.predicate.as_str(),
                    triple.object.as_str(),
                ],
            )
            .map_err(|e| ClosureGraphError::query(e.to_string()))?;
        Ok(changed > 0)
    }

    pub fn remove(&self, triple: &Triple) -> Result<bool, ClosureGraphError> {
        validate_triple(triple)?;
        let changed = self
            .conn
            .execute(
                "DELETE FROM facts WHERE subject=?1 AND predicate=?2 AND object=?3",
                params![
                    triple.subject.as_str(),
                    triple.predicate.as_str(),
                    triple.object.as_str(),
                ],
            )
            .map_err(|e| ClosureGraphError::query(e.to_string()))?;
        Ok(changed > 0)
    }

    pub fn len(&self) -> Result<usize, ClosureGraphError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))
            .map_err(|e| ClosureGraphError::query(e.to_string()))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, ClosureGraphError> {
        Ok(self.len()? == 0)
    }

    fn select(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, ClosureGraphError> {
        let mut sql = String::from("SELECT subject, predicate, object FROM facts");
        let mut clauses = Vec::new();
        let mut values: Vec<&str> = Vec::new();
        for (column, slot) in [
            ("subject", &pattern.subject),
            ("predicate", &pattern.predicate),
            ("object", &pattern.object),
        ] {
            if let Some(node) = slot {
                values.push(node.as_str());
                clauses.push(format!("{column}=?{}", values.len()));
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| ClosureGraphError::query(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                let subject: String = row.get(0)?;
                let predicate: String = row.get(1)?;
                let object: String = row.get(2)?;
                Ok(Triple::new(
                    Node::from(subject),
                    Node::from(predicate),
                    Node::from(object),
                ))
            })
            .map_err(|e| ClosureGraphError::query(e.to_string()))?;
        let mut triples = Vec::new();
        for row in rows {
            let triple = row.map_err(|e| ClosureGraphError::fact_source(e.to_string()))?;
            triples.push(triple);
        }
        Ok(triples)
    }
}

impl Finder for SqliteFactStore {
    fn find(&self, pattern: &TriplePattern) -> Result<TripleIter<'_>, ClosureGraphError> {
        validate_pattern(pattern)?;
        Ok(Box::new(self.select(pattern)?.into_iter()))
    }
}

fn validate_triple(triple: &Triple) -> Result<(), ClosureGraphError> {
    validate_node(&triple.subject, "subject")?;
    validate_node(&triple.predicate, "predicate")?;
    validate_node(&triple.object, "object")
}
