//! `DuckDB` table backing the crime-event store.
//!
//! Sums are computed in SQL. The per-location variant is a single
//! `GROUP BY location_id` query, so a full ranking costs one round trip
//! regardless of how many locations exist.

use std::collections::BTreeMap;

use crime_rate_crime_models::CrimeEvent;
use crime_rate_database_models::EventFilter;
use crime_rate_geography_models::LocationId;
use duckdb::Connection;
use duckdb::types::Value;

use crate::{DbError, count_from_i64, fold_crime_type};

/// Number of rows per INSERT chunk (`DuckDB` handles large batches well).
const CHUNK_SIZE: usize = 5_000;

/// Creates the events table if it does not exist.
///
/// # Errors
///
/// Returns [`DbError`] if the DDL fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS crime_events (
            date TEXT NOT NULL,
            crime_type TEXT NOT NULL,
            crime_count BIGINT NOT NULL,
            location_id BIGINT NOT NULL
        );",
    )?;
    Ok(())
}

/// Builds the WHERE clause and its parameters for `filter`.
///
/// An empty location restriction matches nothing rather than everything.
fn where_clause(filter: &EventFilter) -> (String, Vec<Value>) {
    let mut frags = vec!["contains(date, ?)".to_string()];
    let mut params = vec![Value::Text(filter.year.clone())];

    if let Some(pattern) = filter.crime_type.pattern() {
        frags.push("contains(lower(strip_accents(crime_type)), ?)".to_string());
        params.push(Value::Text(fold_crime_type(pattern)));
    }

    if let Some(ids) = &filter.location_ids {
        if ids.is_empty() {
            frags.push("FALSE".to_string());
        } else {
            let placeholders = vec!["?"; ids.len()].join(", ");
            frags.push(format!("location_id IN ({placeholders})"));
            params.extend(ids.iter().map(|id| Value::BigInt(id.value())));
        }
    }

    (format!(" WHERE {}", frags.join(" AND ")), params)
}

/// Sums `crime_count` over every event matching `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn sum_counts(conn: &Connection, filter: &EventFilter) -> Result<u64, DbError> {
    let (wc, params) = where_clause(filter);
    let sql = format!(
        "SELECT CAST(COALESCE(SUM(crime_count), 0) AS BIGINT) AS total FROM crime_events{wc}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let total: i64 = stmt.query_row(duckdb::params_from_iter(params.iter()), |row| row.get(0))?;
    count_from_i64(total)
}

/// Sums `crime_count` per location over every event matching `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn sum_counts_by_location(
    conn: &Connection,
    filter: &EventFilter,
) -> Result<BTreeMap<LocationId, u64>, DbError> {
    let (wc, params) = where_clause(filter);
    let sql = format!(
        "SELECT location_id, CAST(SUM(crime_count) AS BIGINT) AS total
         FROM crime_events{wc}
         GROUP BY location_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(duckdb::params_from_iter(params.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals = BTreeMap::new();
    for (location_id, total) in rows {
        totals.insert(LocationId(location_id), count_from_i64(total)?);
    }
    Ok(totals)
}

/// Replaces every stored event with `events`. Returns the number of rows
/// written.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails or a count overflows.
pub fn replace_all(conn: &Connection, events: &[CrimeEvent]) -> Result<u64, DbError> {
    conn.execute_batch("DELETE FROM crime_events;")?;

    let mut total = 0u64;
    for chunk in events.chunks(CHUNK_SIZE) {
        let mut sql =
            String::from("INSERT INTO crime_events (date, crime_type, crime_count, location_id) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str("(?, ?, ?, ?)");
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut param_idx = 1usize;
        for event in chunk {
            let count = i64::try_from(event.crime_count).map_err(|_| DbError::Conversion {
                message: format!("crime count {} does not fit BIGINT", event.crime_count),
            })?;
            stmt.raw_bind_parameter(param_idx, &event.date)?;
            stmt.raw_bind_parameter(param_idx + 1, &event.crime_type)?;
            stmt.raw_bind_parameter(param_idx + 2, count)?;
            stmt.raw_bind_parameter(param_idx + 3, event.location_id)?;
            param_idx += 4;
        }

        let rows = stmt.raw_execute()?;
        total += u64::try_from(rows).unwrap_or(0);
    }

    log::info!("Wrote {total} crime events");
    Ok(total)
}
