//! DuckDB migrations

use crate::error::Result;
use crate::series;
use duckdb::Connection;

/// Run all DuckDB migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            name VARCHAR PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    // One price table per collection the resolver can hand out
    for collection in series::collections() {
        let name = format!("001_price_table_{}", collection);
        run_migration(conn, &name, &create_price_table(collection))?;
    }

    tracing::debug!("DuckDB migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running DuckDB migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

fn create_price_table(collection: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    "timestamp" TIMESTAMP NOT NULL,
    symbol VARCHAR NOT NULL,
    open DOUBLE NOT NULL,
    high DOUBLE NOT NULL,
    low DOUBLE NOT NULL,
    close DOUBLE NOT NULL,
    volume_quote DOUBLE NOT NULL,
    volume_base DOUBLE NOT NULL,
    trade_count BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_{table}_symbol_ts" ON "{table}"(symbol, "timestamp");
"#,
        table = collection
    )
}
