//! Cooldown state for analyzed markets
//!
//! The cooldown map persists across runs: a market analyzed at time T is
//! ineligible for re-analysis until T + cooldown, regardless of outcome.
//! The store sits behind a trait so a single process can use the in-memory
//! map while multi-instance deployments plug in the SQLite store.

use std::path::Path;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{info, warn};

/// Read/write access to per-market analysis timestamps
pub trait CooldownStore: Send + Sync {
    /// When this market was last analyzed, if ever
    fn last_analyzed(&self, market_id: &str) -> Option<DateTime<Utc>>;

    /// Record an analysis attempt. Called for every attempted candidate,
    /// including failed and rejected ones, never for budget-skipped ones.
    fn mark_analyzed(&self, market_id: &str, at: DateTime<Utc>);
}

/// Process-memory cooldown store; state dies with the process
#[derive(Default)]
pub struct MemoryCooldownStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CooldownStore for MemoryCooldownStore {
    fn last_analyzed(&self, market_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(market_id).map(|entry| *entry.value())
    }

    fn mark_analyzed(&self, market_id: &str, at: DateTime<Utc>) {
        self.entries.insert(market_id.to_string(), at);
    }
}

/// Errors from the SQLite cooldown store
#[derive(Debug, thiserror::Error)]
pub enum CooldownStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// SQLite-backed cooldown store; survives process restarts
pub struct SqliteCooldownStore {
    conn: Mutex<Connection>,
}

impl SqliteCooldownStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, CooldownStoreError> {
        let conn = Connection::open(db_path.as_ref())?;
        Self::init_schema(&conn)?;
        info!("Opened cooldown store at {:?}", db_path.as_ref());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self, CooldownStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), CooldownStoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cooldowns (
                market_id TEXT PRIMARY KEY,
                last_analyzed_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Delete entries older than the cutoff; markets long out of cooldown
    /// carry no useful state
    pub fn cleanup_before(&self, cutoff: DateTime<Utc>) -> Result<usize, CooldownStoreError> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM cooldowns WHERE last_analyzed_at < ?1",
            params![cutoff.timestamp()],
        )?;
        Ok(deleted)
    }
}

impl CooldownStore for SqliteCooldownStore {
    fn last_analyzed(&self, market_id: &str) -> Option<DateTime<Utc>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT last_analyzed_at FROM cooldowns WHERE market_id = ?1",
            params![market_id],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(ts) => DateTime::from_timestamp(ts, 0),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!("Cooldown lookup failed for {}: {}", market_id, e);
                None
            }
        }
    }

    fn mark_analyzed(&self, market_id: &str, at: DateTime<Utc>) {
        let conn = self.conn.lock();
        if let Err(e) = conn.execute(
            "INSERT OR REPLACE INTO cooldowns (market_id, last_analyzed_at) VALUES (?1, ?2)",
            params![market_id, at.timestamp()],
        ) {
            warn!("Failed to record cooldown for {}: {}", market_id, e);
        }
    }
}
