//! `DuckDB` table backing the population registry.
//!
//! A plain key/value table: the key is the location identifier as text,
//! the value the serialized registry record. Values are stored verbatim so
//! that malformed entries surface at decode time, not at load time.

use duckdb::Connection;

use crate::DbError;

/// Number of rows per INSERT chunk.
const CHUNK_SIZE: usize = 1_000;

/// Creates the registry table if it does not exist.
///
/// # Errors
///
/// Returns [`DbError`] if the DDL fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS population_registry (
            key TEXT NOT NULL PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Returns every key, in key order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn keys(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare("SELECT key FROM population_registry ORDER BY key")?;
    let keys = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}

/// Returns the value stored under `key`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    let mut stmt = conn.prepare("SELECT value FROM population_registry WHERE key = ?")?;
    match stmt.query_row([key], |row| row.get(0)) {
        Ok(v) => Ok(Some(v)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::DuckDb(e)),
    }
}

/// Replaces the whole registry with `entries`.
///
/// Later duplicates of a key overwrite earlier ones. Returns the number of
/// rows written.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn replace_all(conn: &Connection, entries: &[(String, String)]) -> Result<u64, DbError> {
    conn.execute_batch("DELETE FROM population_registry;")?;

    let mut total = 0u64;
    for chunk in entries.chunks(CHUNK_SIZE) {
        let mut sql = String::from("INSERT INTO population_registry (key, value) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str("(?, ?)");
        }
        sql.push_str(" ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value");

        let mut stmt = conn.prepare(&sql)?;
        let mut param_idx = 1usize;
        for (key, value) in chunk {
            stmt.raw_bind_parameter(param_idx, key)?;
            stmt.raw_bind_parameter(param_idx + 1, value)?;
            param_idx += 2;
        }

        let rows = stmt.raw_execute()?;
        total += u64::try_from(rows).unwrap_or(0);
    }

    log::info!("Wrote {total} registry entries");
    Ok(total)
}
