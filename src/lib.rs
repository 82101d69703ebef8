//! Price Series - trailing-window price API
//!
//! Serves the last ten days of close prices for an instrument, optionally
//! with a nine-day trailing rolling average, from one of several DuckDB
//! clusters. Clusters that cannot be reached at startup stay registered as
//! unavailable and answer with a typed error.

pub mod api;
pub mod clusters;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod series;
pub mod services;
pub mod state;
pub mod store;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_series=debug,price_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
