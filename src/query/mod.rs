//! Price query construction and execution

pub mod builder;
pub mod executor;
pub mod plan;

pub use builder::{build, ROLLING_WINDOW_DAYS, TRAILING_DAYS};
pub use executor::QueryExecutor;
pub use plan::{Field, QueryPlan, Stage};
