//! Price Service
//!
//! Serves trailing-window price series from a chosen cluster.
//! Called by the REST API handlers.

use crate::config::DEFAULT_CLUSTER;
use crate::error::ExecutionError;
use crate::models::{QueryDiagnostics, SeriesRow};
use crate::query::builder;
use crate::series::{self, DatasetVariant};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Parameters of one price query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub symbol: String,
    pub cluster: String,
    pub window_enabled: bool,
    pub variant: DatasetVariant,
}

impl Default for PriceQuery {
    fn default() -> Self {
        Self {
            symbol: series::DEFAULT_SYMBOL.to_string(),
            cluster: DEFAULT_CLUSTER.to_string(),
            window_enabled: false,
            variant: DatasetVariant::Derived,
        }
    }
}

/// Wire response: rows under `data`, telemetry under `meta`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricesResponse {
    pub data: Vec<SeriesRow>,
    pub meta: QueryDiagnostics,
}

/// Price service for business logic
pub struct PriceService;

impl PriceService {
    /// Resolve, build and execute one price query relative to `now`
    pub async fn get_prices(
        state: &AppState,
        query: &PriceQuery,
        now: DateTime<Utc>,
    ) -> Result<PricesResponse, ExecutionError> {
        let span = info_span!("price_query", request_id = %Uuid::new_v4(), cluster = %query.cluster);

        async move {
            info!(
                "PriceService::get_prices - {} {} window={} cluster={}",
                query.symbol, query.variant, query.window_enabled, query.cluster
            );

            let handle = state
                .clusters
                .get(&query.cluster)
                .ok_or_else(|| ExecutionError::unavailable(&query.cluster))?;

            debug!("state: building");
            let symbol = series::resolve_symbol(&query.symbol);
            let collection = series::resolve(&query.symbol, query.variant);
            let plan = builder::build(symbol, now, query.window_enabled);

            debug!("state: executing on {}", collection);
            let result = state.executor.execute(handle, collection, &plan).await;

            match &result {
                Ok(r) => debug!("state: succeeded ({} rows)", r.diagnostics.row_count),
                Err(e) => debug!("state: failed ({})", e),
            }

            let result = result?;
            Ok::<_, ExecutionError>(PricesResponse {
                data: result.rows,
                meta: result.diagnostics,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::{ClusterHandle, ClusterRegistry};
    use crate::models::PricePoint;
    use crate::query::QueryExecutor;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 9, 30, 0).unwrap()
    }

    fn point(symbol: &str, day: i64, close: f64) -> PricePoint {
        PricePoint {
            // A minute before the whole-day mark, so day -10 falls just outside the filter
            timestamp: now() + Duration::days(day) - Duration::minutes(1),
            symbol: symbol.to_string(),
            open: close,
            high: close + 5.0,
            low: close - 5.0,
            close,
            volume_quote: 3_000_000.0,
            volume_base: 3_000_000.0 / close,
            trade_count: 2500,
        }
    }

    /// 15 daily BTC points over days -12..=2, plus ETH and raw noise
    fn state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "mock_btc_minutes",
            (-12..=2).map(|d| point("BTC/USD", d, 45_000.0 + 100.0 * d as f64)),
        );
        store.insert(
            "mock_eth_minutes",
            (-3..=0).map(|d| point("ETH/USD", d, 3_000.0 + d as f64)),
        );
        store.insert("btc_eth_merged", vec![point("BTC/USD", -1, 1.0)]);

        let registry = ClusterRegistry::new(vec![
            ClusterHandle::connected("1", store),
            ClusterHandle::unavailable("0", "not provisioned"),
        ]);
        AppState::new(registry, QueryExecutor::new(std::time::Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn test_trailing_window_with_rolling_average() {
        let state = state();
        let query = PriceQuery {
            window_enabled: true,
            ..Default::default()
        };

        let response = PriceService::get_prices(&state, &query, now()).await.unwrap();

        // days -9..=+2
        assert_eq!(response.meta.row_count, 12);
        assert_eq!(response.data.len(), 12);
        assert_eq!(response.data[0].close, 45_000.0 - 900.0);
        assert_eq!(response.data[11].close, 45_000.0 + 200.0);
        assert!(response.data.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        for row in &response.data {
            let window: Vec<f64> = response
                .data
                .iter()
                .filter(|r| r.timestamp >= row.timestamp - Duration::days(9) && r.timestamp <= row.timestamp)
                .map(|r| r.close)
                .collect();
            let expected = window.iter().sum::<f64>() / window.len() as f64;
            assert!((row.rolling_avg.unwrap() - expected).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_without_window_has_no_average() {
        let state = state();
        let response = PriceService::get_prices(&state, &PriceQuery::default(), now())
            .await
            .unwrap();

        assert_eq!(response.meta.row_count, 12);
        assert!(response.data.iter().all(|r| r.rolling_avg.is_none()));
    }

    #[tokio::test]
    async fn test_unavailable_and_unknown_clusters() {
        let state = state();

        for cluster in ["0", "7"] {
            let query = PriceQuery {
                cluster: cluster.to_string(),
                ..Default::default()
            };
            let err = PriceService::get_prices(&state, &query, now()).await.unwrap_err();
            assert_eq!(err.to_string(), format!("cluster {} unavailable", cluster));
        }
    }

    #[tokio::test]
    async fn test_variant_and_symbol_fallbacks() {
        let state = state();

        let raw_btc = PriceQuery {
            variant: DatasetVariant::Raw,
            ..Default::default()
        };
        let response = PriceService::get_prices(&state, &raw_btc, now()).await.unwrap();
        assert_eq!(response.meta.row_count, 1);

        let raw_eth = PriceQuery {
            symbol: "ETH/USD".to_string(),
            variant: DatasetVariant::Raw,
            ..Default::default()
        };
        let response = PriceService::get_prices(&state, &raw_eth, now()).await.unwrap();
        assert_eq!(response.meta.row_count, 4);

        let unknown = PriceQuery {
            symbol: "DOGE/USD".to_string(),
            ..Default::default()
        };
        let response = PriceService::get_prices(&state, &unknown, now()).await.unwrap();
        assert_eq!(response.meta.row_count, 12);
    }

    #[test]
    fn test_response_wire_shape() {
        let response = PricesResponse {
            data: vec![SeriesRow {
                timestamp: now(),
                close: 1.5,
                rolling_avg: None,
            }],
            meta: QueryDiagnostics {
                wall_time_ms: 3,
                engine_time_ms: None,
                row_count: 1,
                payload_size_kb: 0.06,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"][0]["timestamp"], "2025-07-15T09:30:00Z");
        assert!(json["data"][0].get("rolling_avg").is_none());
        assert!(json["meta"]["engine_time_ms"].is_null());
        assert_eq!(json["meta"]["row_count"], 1);
    }
}
