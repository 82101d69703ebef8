//! Backing store adapters

pub mod memory;

use crate::error::StoreError;
use crate::models::SeriesRow;
use crate::query::plan::QueryPlan;
use async_trait::async_trait;

pub use memory::MemoryStore;

/// A store that can run price query plans.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Adapter name for logs (e.g., "duckdb", "memory")
    fn name(&self) -> &'static str;

    /// Run the plan against `collection` and materialize its rows
    async fn aggregate(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> Result<Vec<SeriesRow>, StoreError>;

    /// Engine-reported execution time of the plan, in milliseconds.
    ///
    /// `Ok(None)` when the engine has no such introspection.
    async fn explain(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> Result<Option<f64>, StoreError>;
}
