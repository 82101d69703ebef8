//! REST API types
//!
//! The chart client sends every parameter as a query-string value, with
//! flags as `0`/`1` or `true`/`false`.

use crate::clusters::ClusterStatus;
use crate::config::DEFAULT_CLUSTER;
use crate::services::PriceQuery;
use crate::series::{self, DatasetVariant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query string of `GET /api/prices`
#[derive(Debug, Default, Deserialize)]
pub struct PricesParams {
    pub symbol: Option<String>,
    pub cluster: Option<String>,
    pub window: Option<String>,
    #[serde(rename = "useRaw")]
    pub use_raw: Option<String>,
    /// Sent by the chart client; the trailing window bounds the result instead
    pub limit: Option<String>,
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl PricesParams {
    pub fn into_query(self) -> PriceQuery {
        let variant = if flag(self.use_raw.as_deref()) {
            DatasetVariant::Raw
        } else {
            DatasetVariant::Derived
        };

        PriceQuery {
            symbol: non_empty(self.symbol).unwrap_or_else(|| series::DEFAULT_SYMBOL.to_string()),
            cluster: non_empty(self.cluster).unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
            window_enabled: flag(self.window.as_deref()),
            variant,
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub clusters: BTreeMap<String, ClusterStatus>,
    pub symbols: Vec<String>,
}
