//! Price series data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled OHLCV point as stored in a cluster collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume in quote currency (USDT)
    pub volume_quote: f64,
    /// Volume in base currency (BTC, ETH)
    pub volume_base: f64,
    pub trade_count: i64,
}

/// Projected output row of a price query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_avg: Option<f64>,
}

/// Execution telemetry returned next to the rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDiagnostics {
    pub wall_time_ms: u64,
    /// Reported by the engine itself; `None` when the adapter cannot supply it
    pub engine_time_ms: Option<f64>,
    pub row_count: usize,
    pub payload_size_kb: f64,
}

/// Rows plus diagnostics for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<SeriesRow>,
    pub diagnostics: QueryDiagnostics,
}
