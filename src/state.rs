//! Application state management

use crate::clusters::{ClusterConnector, ClusterRegistry};
use crate::config::ServerConfig;
use crate::query::QueryExecutor;
use std::sync::Arc;

/// Application state shared across all requests
pub struct AppState {
    /// Cluster registry, read-only after startup
    pub clusters: Arc<ClusterRegistry>,

    /// Plan executor
    pub executor: QueryExecutor,
}

impl AppState {
    /// Wrap an already-built registry
    pub fn new(clusters: ClusterRegistry, executor: QueryExecutor) -> Self {
        Self {
            clusters: Arc::new(clusters),
            executor,
        }
    }

    /// Connect all configured clusters and build the state.
    ///
    /// Never fails: clusters that cannot be reached are kept as unavailable.
    pub async fn connect(config: &ServerConfig, connector: &dyn ClusterConnector) -> Self {
        let clusters =
            ClusterRegistry::connect_all(&config.clusters, connector, config.connect_timeout).await;

        Self::new(clusters, QueryExecutor::new(config.query_timeout))
    }
}
