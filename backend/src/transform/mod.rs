//! Transformation module.
//!
//! Pure aggregations over a filtered transaction table:
//! - Filter: inclusive date-range selection
//! - Daily: order count and revenue per calendar day
//! - Category: product categories ranked by quantity
//! - Demographics: row counts per seller state / city
//! - RFM: recency, frequency and monetary value per seller
//! - Dashboard: runs all of the above and derives headline metrics

pub mod category;
pub mod daily;
pub mod dashboard;
pub mod demographics;
pub mod filter;
pub mod rfm;

pub use category::{best_performing, category_quantity, worst_performing};
pub use daily::daily_orders;
pub use dashboard::{build_dashboard, build_from_transactions, Dashboard, DashboardMetrics, TOP_N};
pub use demographics::{by_city, by_state, customer_count, sort_by_count, LocationLevel};
pub use filter::{filter_by_date, filter_transactions};
pub use rfm::{rfm, rfm_averages, top_by_frequency, top_by_monetary, top_by_recency, RfmAverages};
