pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tracing::info;

pub use error::{DbError, Result};

/// How long a writer waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the message store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory store; contents live as long as the `Database`.
    Memory,
}

impl DbLocation {
    pub fn file(path: impl AsRef<Path>) -> Self {
        DbLocation::File(path.as_ref().to_path_buf())
    }
}

/// Single-file SQLite store for parsed MT799 messages.
///
/// The connection is opened on first use and then reused. A failed open is
/// not cached, so a store that becomes reachable later starts working on the
/// next call. All access goes through one mutex, which serialises writers.
pub struct Database {
    location: DbLocation,
    conn: Mutex<Option<Connection>>,
}

impl Database {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            conn: Mutex::new(None),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory)
    }

    /// Open the store now instead of on the first request.
    pub fn check(&self) -> Result<()> {
        self.with_conn(|_| Ok(()))
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        if let Some(conn) = guard.as_ref() {
            return f(conn);
        }
        let conn = guard.insert(self.connect()?);
        f(conn)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.location {
            DbLocation::File(path) => {
                let conn = Connection::open(path).map_err(|source| DbError::Open {
                    path: path.clone(),
                    source,
                })?;
                // WAL lets readers in other processes proceed during a write
                conn.pragma_update(None, "journal_mode", "WAL")?;
                info!("Database opened at {}", path.display());
                conn
            }
            DbLocation::Memory => {
                let conn = Connection::open_in_memory()?;
                info!("In-memory database opened");
                conn
            }
        };

        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run(&conn)?;
        Ok(conn)
    }
}
