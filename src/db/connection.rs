use rusqlite::Connection;
use tracing::info;

use crate::db::snapshots;
use crate::errors::{WatchError, WatchResult};

/// The single SQLite connection owned by the watch loop.
pub struct Database {
    path: String,
    conn: Connection,
}

impl Database {
    pub fn open(path: impl Into<String>) -> WatchResult<Self> {
        let path = path.into();
        let conn = Connection::open(&path)
            .map_err(|e| WatchError::DbError(format!("Open DB {path} failed: {e}")))?;
        Ok(Self { path, conn })
    }

    pub fn open_in_memory() -> WatchResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| WatchError::DbError(format!("Open in-memory DB failed: {e}")))?;
        Ok(Self {
            path: ":memory:".to_string(),
            conn,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides the connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> WatchResult<T>
    where
        F: FnOnce(&Connection) -> WatchResult<T>,
    {
        f(&self.conn)
    }
}

/// Open the database at `path` and make sure the history table exists.
pub fn init_db(path: &str) -> WatchResult<Database> {
    let db = Database::open(path)?;
    db.with_conn(snapshots::ensure_schema)?;
    info!(path, "Preparing Database - Created the table (if didn't exist)");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_db_creates_file_and_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.sqlite3");
        let path = path.to_str().unwrap();

        let db = init_db(path).unwrap();
        assert_eq!(db.path(), path);
        assert!(dir.path().join("housing.sqlite3").exists());

        // Re-opening an existing history is fine.
        drop(db);
        init_db(path).unwrap();
    }

    #[test]
    fn open_fails_for_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("db.sqlite3");
        let err = Database::open(path.to_str().unwrap()).err().unwrap();
        assert!(err.is_fatal());
    }
}
