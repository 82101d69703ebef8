//! Query builder
//!
//! Turns request parameters into a [`QueryPlan`]:
//! 1. time filter: the symbol's rows from the last [`TRAILING_DAYS`]
//! 2. ascending sort on timestamp (window stages depend on it)
//! 3. optional rolling average over [`ROLLING_WINDOW_DAYS`] of elapsed time
//! 4. projection to `timestamp`, `close` and, with the window, `rolling_avg`

use super::plan::{Field, QueryPlan, Stage};
use chrono::{DateTime, Duration, Utc};

/// Width of the served history, measured back from the request instant
pub const TRAILING_DAYS: i64 = 10;

/// Rolling average lookback. Inclusive on both ends, so the window spans
/// ten calendar days of daily samples.
pub const ROLLING_WINDOW_DAYS: i64 = 9;

/// Build the plan for one request
pub fn build(symbol: &str, now: DateTime<Utc>, window_enabled: bool) -> QueryPlan {
    let mut stages = vec![
        Stage::TimeFilter {
            symbol: symbol.to_string(),
            since: now - Duration::days(TRAILING_DAYS),
        },
        Stage::Sort { ascending: true },
    ];

    let mut fields = vec![Field::Timestamp, Field::Close];

    if window_enabled {
        stages.push(Stage::RollingAverage {
            lookback: Duration::days(ROLLING_WINDOW_DAYS),
        });
        fields.push(Field::RollingAvg);
    }

    stages.push(Stage::Projection { fields });

    QueryPlan::new(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_projection_tracks_window_flag() {
        for symbol in ["BTC/USD", "ETH/USD", "XRP/USD"] {
            let with_window = build(symbol, now(), true);
            assert!(with_window.projects(Field::RollingAvg));

            let without_window = build(symbol, now(), false);
            assert!(!without_window.projects(Field::RollingAvg));
            assert_eq!(without_window.projection(), &[Field::Timestamp, Field::Close]);
        }
    }

    #[test]
    fn test_time_filter_is_ten_days_back() {
        let plan = build("BTC/USD", now(), false);
        let (symbol, since) = plan.time_filter().unwrap();

        assert_eq!(symbol, "BTC/USD");
        assert_eq!(since, Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_stage_order() {
        let plan = build("BTC/USD", now(), true);
        let stages = plan.stages();

        assert_eq!(stages.len(), 4);
        assert!(matches!(stages[0], Stage::TimeFilter { .. }));
        assert_eq!(stages[1], Stage::Sort { ascending: true });
        assert_eq!(
            stages[2],
            Stage::RollingAverage { lookback: Duration::days(9) }
        );
        assert!(matches!(stages[3], Stage::Projection { .. }));
    }

    #[test]
    fn test_no_window_stage_without_flag() {
        let plan = build("ETH/USD", now(), false);

        assert_eq!(plan.stages().len(), 3);
        assert!(plan.rolling_lookback().is_none());
    }

    #[test]
    fn test_plan_is_value_of_its_inputs() {
        assert_eq!(build("BTC/USD", now(), true), build("BTC/USD", now(), true));
        assert_ne!(build("BTC/USD", now(), true), build("BTC/USD", now(), false));
    }

    #[test]
    fn test_describe_is_json() {
        let plan = build("BTC/USD", now(), true);
        let described: serde_json::Value = serde_json::from_str(&plan.describe()).unwrap();

        assert_eq!(described["stages"][0]["stage"], "time_filter");
        assert_eq!(described["stages"][2]["lookback"], 9 * 24 * 3600);
    }
}
