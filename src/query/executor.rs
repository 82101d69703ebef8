//! Query executor
//!
//! Runs a plan on a cluster and collects execution telemetry. The explain
//! call is best-effort: its failure only drops `engine_time_ms`.

use super::plan::QueryPlan;
use crate::clusters::ClusterHandle;
use crate::error::ExecutionError;
use crate::models::{QueryDiagnostics, QueryResult};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Plan executor with a per-query time limit
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `plan` against `collection` on the cluster behind `handle`
    pub async fn execute(
        &self,
        handle: &ClusterHandle,
        collection: &str,
        plan: &QueryPlan,
    ) -> Result<QueryResult, ExecutionError> {
        let store = handle
            .store()
            .ok_or_else(|| ExecutionError::unavailable(handle.id()))?;

        debug!("Executing on cluster {} ({}) collection {}", handle.id(), store.name(), collection);

        let explain = async {
            match store.explain(collection, plan).await {
                Ok(engine_ms) => engine_ms,
                Err(e) => {
                    warn!("Explain failed on cluster {}: {}", handle.id(), e);
                    None
                }
            }
        };

        let aggregate = async {
            let started = Instant::now();
            let rows = store.aggregate(collection, plan).await;
            (rows, started.elapsed())
        };

        let ((rows, wall), engine_time_ms) =
            tokio::time::timeout(self.timeout, async { tokio::join!(aggregate, explain) })
                .await
                .map_err(|_| ExecutionError::Timeout { after: self.timeout })?;

        let rows = rows.map_err(|e| {
            error!(
                "Query failed on cluster {} collection {}: {} | plan: {}",
                handle.id(),
                collection,
                e,
                plan.describe()
            );
            ExecutionError::from(e)
        })?;

        let payload = serde_json::to_vec(&rows)?;
        let diagnostics = QueryDiagnostics {
            wall_time_ms: wall.as_millis() as u64,
            engine_time_ms,
            row_count: rows.len(),
            payload_size_kb: round2(payload.len() as f64 / 1024.0),
        };

        info!(
            "Query execution time (wall): {} ms, engine execution time: {}, rows returned: {}, response size: {:.2} KB",
            diagnostics.wall_time_ms,
            diagnostics
                .engine_time_ms
                .map_or_else(|| "n/a".to_string(), |ms| format!("{:.3} ms", ms)),
            diagnostics.row_count,
            diagnostics.payload_size_kb
        );

        Ok(QueryResult { rows, diagnostics })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
