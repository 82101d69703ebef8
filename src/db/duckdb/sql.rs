//! Query plan to DuckDB SQL translation

use crate::error::StoreError;
use crate::query::plan::{Field, QueryPlan, Stage};

/// A plan compiled against one table, with its bind parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub symbol: String,
    pub since_ms: i64,
    pub with_rolling_avg: bool,
}

impl CompiledQuery {
    /// The statement with its parameters inlined, for EXPLAIN
    pub fn literal_sql(&self) -> String {
        let symbol = format!("'{}'", self.symbol.replace('\'', "''"));
        let parts: Vec<&str> = self.sql.splitn(3, '?').collect();
        match parts.as_slice() {
            [head, mid, tail] => format!("{}{}{}{}{}", head, symbol, mid, self.since_ms, tail),
            _ => self.sql.clone(),
        }
    }
}

/// Table names are interpolated into SQL, so they must be plain identifiers
pub fn check_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::Rejected(format!("invalid collection name '{}'", name)))
    }
}

/// Translate `plan` into a single SELECT over `collection`.
///
/// The window function is evaluated after the WHERE clause, so the rolling
/// average only sees rows inside the trailing range.
pub fn compile(collection: &str, plan: &QueryPlan) -> Result<CompiledQuery, StoreError> {
    check_identifier(collection)?;

    let (symbol, since) = plan
        .time_filter()
        .ok_or_else(|| StoreError::Rejected("plan has no time filter".to_string()))?;

    let mut order = "ASC";
    let mut window: Option<String> = None;

    for stage in plan.stages() {
        match stage {
            Stage::Sort { ascending } => order = if *ascending { "ASC" } else { "DESC" },
            Stage::RollingAverage { lookback } => {
                window = Some(format!(
                    "AVG(close) OVER (ORDER BY \"timestamp\" ASC \
                     RANGE BETWEEN INTERVAL '{} seconds' PRECEDING AND CURRENT ROW)",
                    lookback.num_seconds()
                ));
            }
            Stage::TimeFilter { .. } | Stage::Projection { .. } => {}
        }
    }

    let projection = plan.projection();
    if !projection.starts_with(&[Field::Timestamp, Field::Close]) {
        return Err(StoreError::Rejected(
            "projection must start with timestamp, close".to_string(),
        ));
    }

    let mut columns = vec!["epoch_ms(\"timestamp\") AS ts_ms".to_string(), "close".to_string()];
    let with_rolling_avg = projection.contains(&Field::RollingAvg);
    if with_rolling_avg {
        let expr = window.ok_or_else(|| {
            StoreError::Rejected("rolling_avg projected without a window stage".to_string())
        })?;
        columns.push(format!("{} AS rolling_avg", expr));
    }

    let sql = format!(
        "SELECT {columns}
         FROM \"{table}\"
         WHERE symbol = ? AND \"timestamp\" >= epoch_ms(CAST(? AS BIGINT))
         ORDER BY \"timestamp\" {order}",
        columns = columns.join(", "),
        table = collection,
        order = order,
    );

    Ok(CompiledQuery {
        sql,
        symbol: symbol.to_string(),
        since_ms: since.timestamp_millis(),
        with_rolling_avg,
    })
}

/// Pull `Total Time: <secs>s` out of an EXPLAIN ANALYZE profile, in milliseconds
pub fn parse_total_time_ms(profile: &str) -> Option<f64> {
    let (_, rest) = profile.split_once("Total Time:")?;
    let number: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    number.parse::<f64>().ok().map(|secs| secs * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::build;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_compile_with_window() {
        let now = Utc.with_ymd_and_hms(2025, 7, 11, 0, 0, 0).unwrap();
        let compiled = compile("mock_btc_minutes", &build("BTC/USD", now, true)).unwrap();

        assert!(compiled.sql.contains("RANGE BETWEEN INTERVAL '777600 seconds' PRECEDING"));
        assert!(compiled.sql.contains("AS rolling_avg"));
        assert!(compiled.sql.contains("FROM \"mock_btc_minutes\""));
        assert!(compiled.with_rolling_avg);
        assert_eq!(compiled.symbol, "BTC/USD");
        assert_eq!(
            compiled.since_ms,
            Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap().timestamp_millis()
        );
    }

    #[test]
    fn test_compile_without_window() {
        let now = Utc.with_ymd_and_hms(2025, 7, 11, 0, 0, 0).unwrap();
        let compiled = compile("mock_eth_minutes", &build("ETH/USD", now, false)).unwrap();

        assert!(!compiled.sql.contains("rolling_avg"));
        assert!(!compiled.sql.contains("OVER"));
        assert!(compiled.sql.ends_with("ORDER BY \"timestamp\" ASC"));
        assert!(!compiled.with_rolling_avg);
    }

    #[test]
    fn test_rejects_bad_identifier() {
        let plan = build("BTC/USD", Utc::now(), false);
        assert!(compile("prices; DROP TABLE x", &plan).is_err());
        assert!(compile("", &plan).is_err());
    }

    #[test]
    fn test_literal_sql_inlines_parameters() {
        let now = Utc.with_ymd_and_hms(2025, 7, 11, 0, 0, 0).unwrap();
        let compiled = compile("mock_btc_minutes", &build("O'Brien", now, false)).unwrap();
        let literal = compiled.literal_sql();

        assert!(!literal.contains('?'));
        assert!(literal.contains("symbol = 'O''Brien'"));
        assert!(literal.contains(&format!("CAST({} AS BIGINT)", compiled.since_ms)));
    }

    #[test]
    fn test_parse_total_time() {
        let profile = "│┌─────────────────┐│\n││    Total Time: 0.0042s    ││\n";
        let ms = parse_total_time_ms(profile).unwrap();
        assert!((ms - 4.2).abs() < 1e-9);

        assert_eq!(parse_total_time_ms("no timing here"), None);
    }
}
