//! Edge calibration log
//!
//! Optional append-only SQLite log of every ranked edge a run emitted.
//! Edges remain transient pipeline output; this log exists so detector
//! calibration can later compare emitted edges to market outcomes.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

use radar_core::RankedEdge;

#[derive(Debug, thiserror::Error)]
pub enum EdgeLogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// SQLite-backed edge log
pub struct EdgeLog {
    conn: Mutex<Connection>,
}

impl EdgeLog {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, EdgeLogError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path.as_ref())?;
        Self::init_schema(&conn)?;
        info!("Opened edge log at {:?}", db_path.as_ref());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self, EdgeLogError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), EdgeLogError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS edge_log (
                run_id TEXT NOT NULL,
                market_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                direction TEXT NOT NULL,
                edge TEXT NOT NULL,
                confidence TEXT NOT NULL,
                severity TEXT NOT NULL,
                score TEXT NOT NULL,
                signal JSON NOT NULL,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_edge_log_market
            ON edge_log(market_id, recorded_at DESC);",
        )?;
        Ok(())
    }

    /// Append one run's ranked edges; returns the number of rows written
    pub fn record(&self, run_id: &Uuid, edges: &[RankedEdge]) -> Result<usize, EdgeLogError> {
        let conn = self.conn.lock();
        let now = Utc::now().timestamp();
        let mut written = 0;

        for ranked in edges {
            let signal = serde_json::to_string(&ranked.edge.signal)?;
            conn.execute(
                "INSERT INTO edge_log
                 (run_id, market_id, platform, direction, edge, confidence,
                  severity, score, signal, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    run_id.to_string(),
                    ranked.edge.market.id,
                    ranked.edge.market.platform.display_name(),
                    ranked.edge.direction.to_string(),
                    ranked.edge.edge.to_string(),
                    ranked.edge.confidence.to_string(),
                    ranked.severity.to_string(),
                    ranked.score.to_string(),
                    signal,
                    now,
                ],
            )?;
            written += 1;
        }

        debug!("Logged {} edges for run {}", written, run_id);
        Ok(written)
    }

    /// Number of logged edges for one market
    pub fn count_for_market(&self, market_id: &str) -> Result<i64, EdgeLogError> {
        let conn = self.conn.lock();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM edge_log WHERE market_id = ?1",
            params![market_id],
            |row| row.get(0),
        )?)
    }

    /// Drop rows recorded before the cutoff
    pub fn cleanup_before(&self, cutoff: DateTime<Utc>) -> Result<usize, EdgeLogError> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM edge_log WHERE recorded_at < ?1",
            params![cutoff.timestamp()],
        )?;
        if deleted > 0 {
            info!("Cleaned up {} old edge log rows", deleted);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::{Direction, Edge, Market, Platform, Severity, Signal, Urgency};
    use rust_decimal_macros::dec;

    fn ranked(id: &str) -> RankedEdge {
        RankedEdge {
            edge: Edge {
                market: Market {
                    platform: Platform::Kalshi,
                    id: id.to_string(),
                    ticker: None,
                    title: "t".to_string(),
                    category: None,
                    price: dec!(0.50),
                    volume: None,
                    liquidity: None,
                    close_time: None,
                    url: None,
                },
                direction: Direction::Yes,
                edge: dec!(0.10),
                confidence: dec!(0.8),
                reason: "r".to_string(),
                signal: Signal::CrossVenue {
                    counterpart_price: dec!(0.60),
                    spread: dec!(0.10),
                },
                urgency: Urgency::Normal,
            },
            severity: Severity::Actionable,
            score: dec!(0.08),
        }
    }

    #[test]
    fn records_and_counts_edges() {
        let log = EdgeLog::in_memory().unwrap();
        let run_id = Uuid::new_v4();

        let written = log.record(&run_id, &[ranked("m1"), ranked("m1"), ranked("m2")]).unwrap();
        assert_eq!(written, 3);
        assert_eq!(log.count_for_market("m1").unwrap(), 2);
        assert_eq!(log.count_for_market("m2").unwrap(), 1);
    }

    #[test]
    fn cleanup_drops_rows_before_the_cutoff() {
        let log = EdgeLog::in_memory().unwrap();
        log.record(&Uuid::new_v4(), &[ranked("m1")]).unwrap();

        let deleted = log
            .cleanup_before(Utc::now() + chrono::Duration::minutes(1))
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(log.count_for_market("m1").unwrap(), 0);
    }
}
