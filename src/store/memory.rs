//! In-process store that interprets plan stages directly

use super::PriceStore;
use crate::error::StoreError;
use crate::models::{PricePoint, SeriesRow};
use crate::query::plan::{Field, QueryPlan, Stage};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Collections of price points held in memory
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<PricePoint>>>,
}

/// Intermediate row between stages
#[derive(Debug, Clone)]
struct WorkingRow {
    timestamp: DateTime<Utc>,
    close: f64,
    rolling_avg: Option<f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append points to a collection, creating it if needed
    pub fn insert(&self, collection: &str, points: impl IntoIterator<Item = PricePoint>) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .extend(points);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |points| points.len())
    }

    /// Evaluate a plan over a snapshot of `collection`
    pub fn run_plan(&self, collection: &str, plan: &QueryPlan) -> Vec<SeriesRow> {
        let mut rows: Vec<WorkingRow> = Vec::new();
        let mut projection: &[Field] = &[Field::Timestamp, Field::Close];

        for stage in plan.stages() {
            match stage {
                Stage::TimeFilter { symbol, since } => {
                    let guard = self.collections.read();
                    rows = guard
                        .get(collection)
                        .map(|points| {
                            points
                                .iter()
                                .filter(|p| p.symbol == *symbol && p.timestamp >= *since)
                                .map(|p| WorkingRow {
                                    timestamp: p.timestamp,
                                    close: p.close,
                                    rolling_avg: None,
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                }
                Stage::Sort { ascending } => {
                    rows.sort_by_key(|r| r.timestamp);
                    if !ascending {
                        rows.reverse();
                    }
                }
                Stage::RollingAverage { lookback } => {
                    let averages = trailing_means(&rows, *lookback);
                    for (row, avg) in rows.iter_mut().zip(averages) {
                        row.rolling_avg = Some(avg);
                    }
                }
                Stage::Projection { fields } => projection = fields.as_slice(),
            }
        }

        let with_avg = projection.contains(&Field::RollingAvg);
        rows.into_iter()
            .map(|r| SeriesRow {
                timestamp: r.timestamp,
                close: r.close,
                rolling_avg: if with_avg { r.rolling_avg } else { None },
            })
            .collect()
    }
}

/// Mean of `close` over `[t - lookback, t]` for each row, rows sorted ascending.
///
/// Rows sharing a timestamp are peers: each one's window includes all of them.
fn trailing_means(rows: &[WorkingRow], lookback: Duration) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(rows.len() + 1);
    prefix.push(0.0);
    for row in rows {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + row.close);
    }

    rows.iter()
        .map(|row| {
            let start = row.timestamp - lookback;
            let lo = rows.partition_point(|r| r.timestamp < start);
            let hi = rows.partition_point(|r| r.timestamp <= row.timestamp);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}

#[async_trait]
impl PriceStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn aggregate(
        &self,
        collection: &str,
        plan: &QueryPlan,
    ) -> Result<Vec<SeriesRow>, StoreError> {
        Ok(self.run_plan(collection, plan))
    }

    async fn explain(
        &self,
        _collection: &str,
        _plan: &QueryPlan,
    ) -> Result<Option<f64>, StoreError> {
        Ok(None)
    }
}
