//! SQLite-backed metrics row.
//!
//! One table, one row (`id = 1`), with a `version` column so writers can
//! detect each other. Several processes may open the same file; every
//! statement waits at most `busy_timeout` for the file lock.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use super::backend::PersistenceBackend;
use super::error::Result;
use super::record::{MetricsRecord, StoredMetrics};

pub const SINGLETON_ID: i64 = 1;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the metrics database at `path`.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!("Opened metrics database at {}", path.as_ref().display());
        Self::from_connection(conn, busy_timeout)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS impact_metrics (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL,
                total_distance_km REAL NOT NULL,
                total_emissions_kg REAL NOT NULL,
                fuel_savings_liters REAL NOT NULL,
                cost_savings_usd REAL NOT NULL,
                route_count INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceBackend for SqliteBackend {
    fn get_singleton(&self) -> Result<Option<StoredMetrics>> {
        let conn = self.lock();
        let stored = conn
            .query_row(
                "SELECT id, version, total_distance_km, total_emissions_kg,
                        fuel_savings_liters, cost_savings_usd, route_count, updated_at
                 FROM impact_metrics WHERE id = ?1",
                params![SINGLETON_ID],
                |row| {
                    Ok(StoredMetrics {
                        id: row.get(0)?,
                        version: row.get(1)?,
                        record: MetricsRecord {
                            total_distance_km: row.get(2)?,
                            total_emissions_kg: row.get(3)?,
                            fuel_savings_liters: row.get(4)?,
                            cost_savings_usd: row.get(5)?,
                            route_count: row.get::<_, i64>(6)?.max(0) as u64,
                            updated_at: row.get(7)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }

    /// `Ok(false)` only when the row already exists; any other constraint
    /// failure is a storage error.
    fn insert(&self, record: &MetricsRecord) -> Result<bool> {
        let conn = self.lock();
        let inserted = conn.execute(
            "INSERT INTO impact_metrics
                (id, version, total_distance_km, total_emissions_kg,
                 fuel_savings_liters, cost_savings_usd, route_count, updated_at)
             VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                SINGLETON_ID,
                record.total_distance_km,
                record.total_emissions_kg,
                record.fuel_savings_liters,
                record.cost_savings_usd,
                record.route_count as i64,
                record.updated_at,
            ],
        );
        match inserted {
            Ok(count) => Ok(count == 1),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, id: i64, expected_version: i64, record: &MetricsRecord) -> Result<bool> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE impact_metrics
             SET version = version + 1,
                 total_distance_km = ?3,
                 total_emissions_kg = ?4,
                 fuel_savings_liters = ?5,
                 cost_savings_usd = ?6,
                 route_count = ?7,
                 updated_at = ?8
             WHERE id = ?1 AND version = ?2",
            params![
                id,
                expected_version,
                record.total_distance_km,
                record.total_emissions_kg,
                record.fuel_savings_liters,
                record.cost_savings_usd,
                record.route_count as i64,
                record.updated_at,
            ],
        )?;
        Ok(changed == 1)
    }
}
