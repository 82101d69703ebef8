//! Cluster connectors

use crate::config::ClusterConfig;
use crate::db::duckdb::DuckDb;
use crate::error::{AppError, Result};
use crate::store::PriceStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Opens the backing store for one configured cluster
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self, config: &ClusterConfig) -> Result<Arc<dyn PriceStore>>;
}

/// Connects clusters backed by DuckDB files
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbConnector;

#[async_trait]
impl ClusterConnector for DuckDbConnector {
    async fn connect(&self, config: &ClusterConfig) -> Result<Arc<dyn PriceStore>> {
        let uri = config
            .uri
            .clone()
            .ok_or_else(|| AppError::Config(format!("cluster {} has no URI configured", config.id)))?;

        let db = tokio::task::spawn_blocking(move || DuckDb::open(&uri))
            .await
            .map_err(|e| AppError::Connection(e.to_string()))??;

        Ok(Arc::new(db))
    }
}
