//! Server configuration derived from environment variables.
//!
//! Cluster URIs keep the `CLUSTER<n>_URI` names so an existing `.env` file
//! can be reused. Each URI is a DuckDB file path or `:memory:`; an empty or
//! missing URI leaves that cluster unprovisioned.

use std::env;
use std::time::Duration;

/// Cluster ids served by default, in `CLUSTER<id>_URI` order
pub const CLUSTER_IDS: [&str; 2] = ["0", "1"];

/// Cluster used when a request does not name one
pub const DEFAULT_CLUSTER: &str = "1";

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// One backing cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub id: String,
    /// `None` when not provisioned
    pub uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub clusters: Vec<ClusterConfig>,
    pub query_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let var_u64 = |name: &str, default: u64| {
            var(name).and_then(|s| s.parse().ok()).unwrap_or(default)
        };

        let clusters = CLUSTER_IDS
            .iter()
            .map(|id| ClusterConfig {
                id: id.to_string(),
                uri: var(&format!("CLUSTER{}_URI", id)),
            })
            .collect();

        Self {
            host: var("PRICE_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|s| s.parse().ok()).unwrap_or(5000),
            clusters,
            query_timeout: Duration::from_millis(var_u64(
                "PRICE_QUERY_TIMEOUT_MS",
                DEFAULT_QUERY_TIMEOUT_MS,
            )),
            connect_timeout: Duration::from_millis(var_u64(
                "PRICE_CONNECT_TIMEOUT_MS",
                DEFAULT_CONNECT_TIMEOUT_MS,
            )),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
