//! DuckDB database module for cluster price data

mod migrations;
pub mod sql;

use crate::error::{AppError, Result, StoreError};
use crate::models::{PricePoint, SeriesRow};
use crate::query::plan::QueryPlan;
use crate::store::PriceStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::Type;
use duckdb::Connection;
use parking_lot::Mutex;
use sql::CompiledQuery;
use std::path::Path;

/// URI that opens a throwaway in-memory database
pub const MEMORY_URI: &str = ":memory:";

/// DuckDB database wrapper.
///
/// The base connection handles migrations and inserts. Every query runs on
/// its own `try_clone`d connection to the same database, so a slow or
/// abandoned statement never blocks the next request.
pub struct DuckDb {
    conn: Mutex<Connection>,
}

impl DuckDb {
    /// Open a DuckDB file (or `:memory:`) and run migrations
    pub fn open(uri: &str) -> Result<Self> {
        let conn = if uri == MEMORY_URI {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(uri))?
        };

        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    /// Insert price points into a collection table
    pub fn insert_price_points(&self, collection: &str, points: &[PricePoint]) -> Result<usize> {
        sql::check_identifier(collection).map_err(|e| AppError::Validation(e.to_string()))?;

        let mut conn = self.conn.lock();

        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{}\" (\"timestamp\", symbol, open, high, low, close, volume_quote, volume_base, trade_count)
             VALUES (epoch_ms(CAST(? AS BIGINT)), ?, ?, ?, ?, ?, ?, ?, ?)",
            collection
        ))?;

        let mut count = 0;
        for point in points {
            stmt.execute(duckdb::params![
                point.timestamp.timestamp_millis(),
                point.symbol,
                point.open,
                point.high,
                point.low,
                point.close,
                point.volume_quote,
                point.volume_base,
                point.trade_count,
            ])?;
            count += 1;
        }

        drop(stmt);
        tx.commit()?;

        Ok(count)
    }

    /// A fresh connection sharing this database; the base lock is held only while cloning
    fn query_connection(&self) -> duckdb::Result<Connection> {
        self.conn.lock().try_clone()
    }

    fn run_compiled(conn: &Connection, query: &CompiledQuery) -> duckdb::Result<Vec<SeriesRow>> {
        let mut stmt = conn.prepare(&query.sql)?;
        let with_avg = query.with_rolling_avg;

        let rows = stmt
            .query_map(duckdb::params![query.symbol, query.since_ms], |row| {
                Ok(SeriesRow {
                    timestamp: timestamp_from_ms(row.get(0)?)?,
                    close: row.get(1)?,
                    rolling_avg: if with_avg { row.get(2)? } else { None },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn explain_compiled(conn: &Connection, query: &CompiledQuery) -> duckdb::Result<Option<f64>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN ANALYZE {}", query.literal_sql()))?;

        let profiles = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(profiles.iter().find_map(|p| sql::parse_total_time_ms(p)))
    }
}

fn timestamp_from_ms(ms: i64) -> duckdb::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        duckdb::Error::FromSqlConversionFailure(
            0,
            Type::BigInt,
            format!("timestamp {} ms is out of range", ms).into(),
        )
    })
}

#[async_trait]
impl PriceStore for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    async fn aggregate(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> std::result::Result<Vec<SeriesRow>, StoreError> {
        let query = sql::compile(collection, plan)?;
        let conn = self.query_connection()?;

        let rows = tokio::task::spawn_blocking(move || Self::run_compiled(&conn, &query))
        .await??;

        Ok(rows)
    }

    async fn explain(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> std::result::Result<Option<f64>, StoreError> {
        let query = sql::compile(collection, plan)?;
        let conn = self.query_connection()?;

        let engine_ms = tokio::task::spawn_blocking(move || Self::explain_compiled(&conn, &query))
        .await??;

        Ok(engine_ms)
    }
}
