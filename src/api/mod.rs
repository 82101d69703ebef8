//! REST API module
//!
//! Provides:
//! - Price series endpoint (`GET /api/prices`)
//! - Health check (`GET /health`) with per-cluster availability
//! - Plain-text probe (`GET /test`)

pub mod handlers;
mod server;
pub mod types;

pub use server::{router, ApiServer};
pub use types::{HealthResponse, PricesParams};
