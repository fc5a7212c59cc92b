use rusqlite::Connection;

use crate::errors::ClosureGraphError;

pub fn ensure_schema(conn: &Connection) -> Result<(), ClosureGraphError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS facts (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            subject   TEXT NOT NULL,
            predicate TEXT NOT NULL,
            object    TEXT NOT NULL,
            UNIQUE(subject, predicate, object)
        );
        CREATE INDEX IF NOT EXISTS idx_facts_predicate ON facts(predicate);
        CREATE INDEX IF NOT EXISTS idx_facts_subject ON facts(subject, predicate);
        CREATE INDEX IF NOT EXISTS idx_facts_object ON facts(object, predicate);
        "#,
    )
    .map_err(|e| ClosureGraphError::schema(e.to_string()))?;
    Ok(())
}
