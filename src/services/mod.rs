//! Services Layer
//!
//! Business logic behind the REST API handlers. Handlers parse and
//! serialize; services resolve clusters and collections and run queries.
//!
//! # Services
//!
//! - `PriceService` - Trailing-window price series with optional rolling average

pub mod price_service;

pub use price_service::{PriceQuery, PriceService, PricesResponse};
