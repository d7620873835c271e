//! # Salesdash - sales analytics over an order/seller dataset
//!
//! Salesdash loads a pre-joined order, product and seller table, filters it
//! by date range and computes the tables behind a sales dashboard: daily
//! orders and revenue, category ranking, customer counts by seller location
//! and RFM metrics per seller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│  Dashboard  │
//! │ (load once) │     │  (Dataset)  │     │ (aggregate) │     │ (JSON/HTTP) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesdash::{build_dashboard, load_dataset};
//!
//! let dataset = load_dataset("main_data.csv").unwrap();
//! let dashboard = build_dashboard(&dataset, dataset.date_bounds());
//! println!("Total revenue: {}", dashboard.metrics.total_revenue);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Environment and flag configuration
//! - [`models`] - Transactions, dataset handle, date range, view rows
//! - [`parser`] - CSV loading with auto-detection
//! - [`transform`] - Filter, aggregations and dashboard assembly
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Aggregation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, DatasetError, FilterError, ServerError};

// =============================================================================
// Re-exports - Config and models
// =============================================================================

pub use config::AppConfig;

pub use models::{
    CategoryQuantity, DailyOrders, Dataset, DateRange, LoadInfo, LocationCount, RfmRow,
    Transaction,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{load_bytes, load_dataset, parse_transactions, REQUIRED_COLUMNS};

// =============================================================================
// Re-exports - Transformations
// =============================================================================

pub use transform::{
    best_performing, build_dashboard, build_from_transactions, by_city, by_state,
    category_quantity, customer_count, daily_orders, filter_by_date, filter_transactions, rfm,
    rfm_averages, worst_performing, Dashboard, DashboardMetrics, LocationLevel, RfmAverages,
    TOP_N,
};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
