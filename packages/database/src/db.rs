//! `DuckDB` snapshot connection.
//!
//! One `DuckDB` file holds both the population registry and the
//! crime-event table. The load phase writes it; query sessions only read.

use std::collections::BTreeMap;
use std::path::Path;

use crime_rate_crime_models::CrimeEvent;
use crime_rate_database_models::EventFilter;
use crime_rate_geography_models::LocationId;
use duckdb::{AccessMode, Config, Connection};

use crate::{CrimeEventStore, DbError, PopulationRegistry, events_db, registry_db};

/// Both stores backed by one `DuckDB` connection.
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Opens (or creates) the snapshot at `path` for writing and ensures
    /// the schema exists. Query sessions use [`connect`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connectivity`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            crate::paths::ensure_dir(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| DbError::Connectivity {
            message: format!("{}: {e}", path.display()),
        })?;

        Self::from_connection(conn)
    }

    /// Opens a throwaway in-memory snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connectivity`] if `DuckDB` cannot start.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Connectivity {
            message: format!("in-memory database: {e}"),
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        registry_db::create_schema(&conn)?;
        events_db::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an existing snapshot for querying.
    ///
    /// The file is opened read-only and never created; the schema must
    /// already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connectivity`] if the file is missing or cannot
    /// be opened.
    pub fn open_read_only(path: &Path) -> Result<Self, DbError> {
        if !path.is_file() {
            return Err(DbError::Connectivity {
                message: format!("no snapshot at {}", path.display()),
            });
        }

        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| DbError::Connectivity {
                message: e.to_string(),
            })?;
        let conn = Connection::open_with_flags(path, config).map_err(|e| {
            DbError::Connectivity {
                message: format!("{}: {e}", path.display()),
            }
        })?;

        Ok(Self { conn })
    }

    /// Replaces the registry and the events in one transaction. Either
    /// both are replaced or neither is.
    ///
    /// Returns the number of registry entries and events written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any write fails; the snapshot is then left
    /// as it was.
    pub fn replace_snapshot(
        &self,
        entries: &[(String, String)],
        events: &[CrimeEvent],
    ) -> Result<(u64, u64), DbError> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;

        let written = registry_db::replace_all(&self.conn, entries).and_then(|registry| {
            events_db::replace_all(&self.conn, events).map(|events| (registry, events))
        });

        match written {
            Ok(counts) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(counts)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::error!("Rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    fn ping_table(&self, table: &str) -> Result<(), DbError> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|_| ())
            .map_err(|e| DbError::Connectivity {
                message: format!("{table}: {e}"),
            })
    }
}
impl PopulationRegistry for DuckDbStore {
    fn ping(&self) -> Result<(), DbError> {
        self.ping_table("population_registry")
    }

    fn keys(&self) -> Result<Vec<String>, DbError> {
        registry_db::keys(&self.conn)
    }

    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        registry_db::get(&self.conn, key)
    }
}

impl CrimeEventStore for DuckDbStore {
    fn ping(&self) -> Result<(), DbError> {
        self.ping_table("crime_events")
    }

    fn sum_counts(&self, filter: &EventFilter) -> Result<u64, DbError> {
        events_db::sum_counts(&self.conn, filter)
    }

    fn sum_counts_by_location(
        &self,
        filter: &EventFilter,
    ) -> Result<BTreeMap<LocationId, u64>, DbError> {
        events_db::sum_counts_by_location(&self.conn, filter)
    }
}

/// Opens an existing snapshot read-only and verifies both stores answer.
///
/// # Errors
///
/// Returns [`DbError::Connectivity`] if the snapshot is missing, cannot be
/// opened, or either store fails its ping.
pub fn connect(path: &Path) -> Result<DuckDbStore, DbError> {
    log::info!("Opening snapshot {}", path.display());
    let store = DuckDbStore::open_read_only(path)?;
    PopulationRegistry::ping(&store)?;
    CrimeEventStore::ping(&store)?;
    Ok(store)
}
