use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::snapshot::TIMESTAMP_FORMAT;
use crate::domain::{ListingSnapshot, PersistedRow};
use crate::errors::{WatchError, WatchResult};

const SQL_SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create the history table if it is not there yet. Safe to repeat.
pub fn ensure_schema(conn: &Connection) -> WatchResult<()> {
    conn.execute_batch(SQL_SCHEMA)
        .map_err(|e| WatchError::DbError(format!("Failed to apply schema: {e}")))
}

/// Fingerprint of the most recently inserted row.
///
/// `None` means the table is empty. `Some(None)` means the newest row has a
/// NULL `Hash`, which never matches a fresh snapshot.
pub fn latest_fingerprint(conn: &Connection) -> WatchResult<Option<Option<String>>> {
    conn.query_row(
        "SELECT Hash FROM your_house ORDER BY ID DESC LIMIT 1",
        [],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map_err(|e| WatchError::DbError(format!("select latest hash failed: {e}")))
}

/// Append one observation. Existing rows are never touched.
pub fn append_snapshot(conn: &Connection, snap: &ListingSnapshot) -> WatchResult<i64> {
    conn.execute(
        r#"
        INSERT INTO your_house (Price, Address, ZipCode, Surface, URL, Hash, LastUpdated)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            snap.price,
            snap.address,
            snap.zipcode,
            snap.surface_area,
            snap.url,
            snap.fingerprint,
            snap.observed_at_display(),
        ],
    )
    .map_err(|e| WatchError::DbError(format!("insert snapshot failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

/// Full row with the highest id, if any.
pub fn latest_snapshot(conn: &Connection) -> WatchResult<Option<PersistedRow>> {
    conn.query_row(
        r#"
        SELECT ID, Price, Address, ZipCode, Surface, URL, Hash, LastUpdated
        FROM your_house
        ORDER BY ID DESC
        LIMIT 1
        "#,
        [],
        |row| {
            let last_updated: Option<String> = row.get(7)?;
            Ok(PersistedRow {
                id: row.get(0)?,
                price: text_or_null(row.get(1)?),
                address: text_or_null(row.get(2)?),
                zipcode: text_or_null(row.get(3)?),
                surface_area: text_or_null(row.get(4)?),
                url: text_or_null(row.get(5)?),
                fingerprint: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                last_updated: last_updated
                    .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
            })
        },
    )
    .optional()
    .map_err(|e| WatchError::DbError(format!("select latest row failed: {e}")))
}

pub fn count_snapshots(conn: &Connection) -> WatchResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM your_house", [], |r| r.get(0))
        .map_err(|e| WatchError::DbError(format!("count rows failed: {e}")))
}

fn text_or_null(v: Option<String>) -> String {
    v.unwrap_or_else(|| crate::domain::snapshot::NULL_SENTINEL.to_string())
}
