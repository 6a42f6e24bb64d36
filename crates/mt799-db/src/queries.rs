use mt799_types::ParsedMessage;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::Database;
use crate::error::Result;
use crate::models::SwiftMessageRow;

impl Database {
    /// Write one parsed message and return the id the store assigned to it.
    ///
    /// The table is re-ensured on every call, so a store file that was
    /// removed or recreated underneath the service still accepts the row.
    pub fn persist(&self, msg: &ParsedMessage) -> Result<i64> {
        self.with_conn(|conn| {
            crate::migrations::run(conn)?;
            let id = insert_message(conn, msg)?;
            debug!("Persisted SwiftMessages row {}", id);
            Ok(id)
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<SwiftMessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Most recent rows first.
    pub fn list_messages(&self, limit: u32) -> Result<Vec<SwiftMessageRow>> {
        self.with_conn(|conn| query_messages(conn, limit))
    }

    pub fn count_messages(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM SwiftMessages", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}

fn insert_message(conn: &Connection, msg: &ParsedMessage) -> Result<i64> {
    conn.execute(
        "INSERT INTO SwiftMessages (Reference, RelatedReference, Narrative) VALUES (?1, ?2, ?3)",
        (&msg.reference, &msg.related_reference, &msg.narrative),
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<SwiftMessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT Id, Reference, RelatedReference, Narrative FROM SwiftMessages WHERE Id = ?1",
    )?;

    let row = stmt.query_row([id], map_row).optional()?;
    Ok(row)
}

fn query_messages(conn: &Connection, limit: u32) -> Result<Vec<SwiftMessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT Id, Reference, RelatedReference, Narrative
         FROM SwiftMessages
         ORDER BY Id DESC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

// Columns are nullable TEXT; rows written by other tools may hold NULLs.
fn map_row(row: &Row<'_>) -> rusqlite::Result<SwiftMessageRow> {
    Ok(SwiftMessageRow {
        id: row.get(0)?,
        reference: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        related_reference: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        narrative: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::{DbError, DbLocation};

    fn sample(reference: &str) -> ParsedMessage {
        ParsedMessage {
            reference: reference.to_string(),
            related_reference: "RELREF456".to_string(),
            narrative: "Hello World".to_string(),
        }
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbLocation::file(dir.path().join("SwiftMessages.db")));

        let id = db.persist(&sample("REF123")).unwrap();
        let row = db.get_message(id).unwrap().unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.reference, "REF123");
        assert_eq!(row.related_reference, "RELREF456");
        assert_eq!(row.narrative, "Hello World");
    }

    #[test]
    fn test_ids_are_distinct_and_increasing() {
        let db = Database::in_memory();
        let a = db.persist(&sample("A")).unwrap();
        let b = db.persist(&sample("B")).unwrap();
        let c = db.persist(&sample("A")).unwrap();
        assert!(a < b && b < c);
        assert_eq!(db.count_messages().unwrap(), 3);
    }

    #[test]
    fn test_values_bound_not_interpolated() {
        let db = Database::in_memory();
        let nasty = "x'); DROP TABLE SwiftMessages; --";
        let id = db.persist(&sample(nasty)).unwrap();
        assert_eq!(db.get_message(id).unwrap().unwrap().reference, nasty);
        assert_eq!(db.count_messages().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_row() {
        let db = Database::in_memory();
        assert!(db.get_message(42).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let db = Database::in_memory();
        for r in ["one", "two", "three"] {
            db.persist(&sample(r)).unwrap();
        }
        let rows = db.list_messages(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reference, "three");
        assert_eq!(rows[1].reference, "two");
    }

    #[test]
    fn test_schema_recreated_after_drop() {
        let db = Database::in_memory();
        db.persist(&sample("before")).unwrap();
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE SwiftMessages;")?;
            Ok(())
        })
        .unwrap();
        let id = db.persist(&sample("after")).unwrap();
        assert_eq!(db.get_message(id).unwrap().unwrap().reference, "after");
    }

    #[test]
    fn test_unwritable_path_fails_then_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("later");
        let db = Database::new(DbLocation::file(sub.join("SwiftMessages.db")));

        let err = db.persist(&sample("REF")).unwrap_err();
        assert!(matches!(err, DbError::Open { .. }));

        std::fs::create_dir(&sub).unwrap();
        let id = db.persist(&sample("REF")).unwrap();
        assert_eq!(db.get_message(id).unwrap().unwrap().reference, "REF");
    }

    #[test]
    fn test_two_handles_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SwiftMessages.db");
        let first = Database::new(DbLocation::file(&path));
        let second = Database::new(DbLocation::file(&path));

        let a = first.persist(&sample("first")).unwrap();
        let b = second.persist(&sample("second")).unwrap();
        assert_ne!(a, b);
        assert_eq!(first.count_messages().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(DbLocation::file(dir.path().join("SwiftMessages.db"))));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                thread::spawn(move || {
                    (0..10)
                        .map(|j| db.persist(&sample(&format!("T{}-{}", i, j))).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<i64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 80);
        assert_eq!(db.count_messages().unwrap(), 80);
    }
}
