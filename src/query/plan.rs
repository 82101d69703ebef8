//! Query plan value types

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Output fields a plan may project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Timestamp,
    Close,
    RollingAvg,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Close => "close",
            Self::RollingAvg => "rolling_avg",
        }
    }
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Keep rows of `symbol` with `timestamp >= since`
    TimeFilter {
        symbol: String,
        since: DateTime<Utc>,
    },
    /// Order by timestamp
    Sort { ascending: bool },
    /// Mean of `close` over `[timestamp - lookback, timestamp]`, per row
    RollingAverage {
        #[serde(serialize_with = "serialize_duration_secs")]
        lookback: Duration,
    },
    Projection { fields: Vec<Field> },
}

fn serialize_duration_secs<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.num_seconds())
}

/// Ordered stages of one price query.
///
/// Built by [`crate::query::builder::build`]; adapters translate or
/// interpret it but never alter it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    stages: Vec<Stage>,
}

impl QueryPlan {
    pub(crate) fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// `(symbol, since)` of the time filter stage
    pub fn time_filter(&self) -> Option<(&str, DateTime<Utc>)> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::TimeFilter { symbol, since } => Some((symbol.as_str(), *since)),
            _ => None,
        })
    }

    pub fn rolling_lookback(&self) -> Option<Duration> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::RollingAverage { lookback } => Some(*lookback),
            _ => None,
        })
    }

    pub fn projection(&self) -> &[Field] {
        self.stages
            .iter()
            .find_map(|stage| match stage {
                Stage::Projection { fields } => Some(fields.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn projects(&self, field: Field) -> bool {
        self.projection().contains(&field)
    }

    /// Compact JSON form used in diagnostic logs
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self.stages))
    }
}
