use rusqlite::Connection;
use tracing::trace;

use crate::error::Result;

/// Create the message table if it is not there yet. Safe to call on every write.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS SwiftMessages (
            Id                INTEGER PRIMARY KEY AUTOINCREMENT,
            Reference         TEXT,
            RelatedReference  TEXT,
            Narrative         TEXT
        );
        ",
    )?;

    trace!("SwiftMessages schema ensured");
    Ok(())
}
