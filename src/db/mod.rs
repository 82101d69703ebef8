//! Database modules

pub mod duckdb;
