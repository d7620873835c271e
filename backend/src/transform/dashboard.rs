//! Dashboard assembly.
//!
//! Runs the date filter and every aggregation for one request and derives
//! the headline metrics shown above the charts.
//!
//! # Example
//!
//! ```rust,ignore
//! use salesdash::{build_dashboard, load_dataset, DateRange};
//!
//! let dataset = load_dataset("main_data.csv")?;
//! let dashboard = build_dashboard(&dataset, dataset.date_bounds());
//! println!("{} orders", dashboard.metrics.total_orders);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{best_performing, category_quantity, worst_performing};
use super::daily::{daily_orders, total_orders, total_revenue};
use super::demographics::{by_city, by_state, sort_by_count};
use super::filter::filter_by_date;
use super::rfm::{rfm, rfm_averages, top_by_frequency, top_by_monetary, top_by_recency};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::models::{
    CategoryQuantity, DailyOrders, Dataset, DateRange, LocationCount, RfmRow, Transaction,
};

/// Size of the best/worst and top-seller lists.
pub const TOP_N: usize = 5;

/// Headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub seller_count: usize,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: Decimal,
}

/// Every view for one date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    /// Range applied, `None` when the dataset is empty and no range was asked.
    pub range: Option<DateRange>,
    /// Rows left after filtering.
    pub row_count: usize,
    pub metrics: DashboardMetrics,
    pub daily_orders: Vec<DailyOrders>,
    pub categories: Vec<CategoryQuantity>,
    pub best_categories: Vec<CategoryQuantity>,
    pub worst_categories: Vec<CategoryQuantity>,
    /// Largest count first.
    pub customers_by_state: Vec<LocationCount>,
    /// Largest count first.
    pub customers_by_city: Vec<LocationCount>,
    pub rfm: Vec<RfmRow>,
    pub top_recency: Vec<RfmRow>,
    pub top_frequency: Vec<RfmRow>,
    pub top_monetary: Vec<RfmRow>,
}

/// Filter `dataset` to `range` and compute every view.
pub fn build_dashboard(dataset: &Dataset, range: Option<DateRange>) -> Dashboard {
    match range {
        Some(r) => log_info(format!("📊 Building dashboard for {} → {}", r.start, r.end)),
        None => log_info("📊 Building dashboard for the full dataset"),
    }

    let filtered = filter_by_date(dataset, range.as_ref());
    if filtered.is_empty() {
        log_warning("No transactions in the selected range");
    }

    let dashboard = build_from_transactions(&filtered, range);
    log_success(format!(
        "{} rows, {} days, {} categories, {} sellers",
        dashboard.row_count,
        dashboard.daily_orders.len(),
        dashboard.categories.len(),
        dashboard.rfm.len()
    ));

    dashboard
}

/// Compute every view over already filtered rows.
pub fn build_from_transactions(transactions: &[Transaction], range: Option<DateRange>) -> Dashboard {
    let daily = daily_orders(transactions);
    let categories = category_quantity(transactions);
    let sellers = rfm(transactions);
    let averages = rfm_averages(&sellers);

    let metrics = DashboardMetrics {
        total_orders: total_orders(&daily),
        total_revenue: total_revenue(&daily),
        seller_count: sellers.len(),
        avg_recency: averages.recency,
        avg_frequency: averages.frequency,
        avg_monetary: averages.monetary,
    };

    Dashboard {
        range,
        row_count: transactions.len(),
        metrics,
        best_categories: best_performing(&categories, TOP_N).to_vec(),
        worst_categories: worst_performing(&categories, TOP_N).to_vec(),
        customers_by_state: sort_by_count(by_state(transactions)),
        customers_by_city: sort_by_count(by_city(transactions)),
        top_recency: top_by_recency(&sellers, TOP_N),
        top_frequency: top_by_frequency(&sellers, TOP_N),
        top_monetary: top_by_monetary(&sellers, TOP_N),
        daily_orders: daily,
        categories,
        rfm: sellers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn tx(order_id: &str, ts: &str, price: &str, category: &str, seller: &str) -> Transaction {
        Transaction {
            order_id: order_id.to_string(),
            order_approved_at: crate::parser::parse_timestamp(ts).unwrap(),
            price: Decimal::from_str(price).unwrap(),
            product_category_name: Some(category.to_string()),
            seller_id: seller.to_string(),
            seller_state: if seller == "S1" { "SP" } else { "RJ" }.to_string(),
            seller_city: if seller == "S1" { "campinas" } else { "niteroi" }.to_string(),
        }
    }

    fn sample() -> Dataset {
        Dataset::from_transactions(vec![
            tx("o1", "2023-01-01 09:00:00", "10", "toys", "S1"),
            tx("o1", "2023-01-01 09:00:00", "15", "books", "S1"),
            tx("o2", "2023-01-03 12:00:00", "20", "books", "S2"),
            tx("o3", "2023-01-10 18:00:00", "5", "food", "S1"),
        ])
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn test_full_range() {
        let dataset = sample();
        let dashboard = build_dashboard(&dataset, dataset.date_bounds());

        assert_eq!(dashboard.row_count, 4);
        assert_eq!(dashboard.metrics.total_orders, 3);
        assert_eq!(dashboard.metrics.total_revenue, Decimal::from(50));
        assert_eq!(dashboard.metrics.seller_count, 2);
        assert_eq!(dashboard.daily_orders.len(), 10);
        assert_eq!(dashboard.best_categories[0].category, "books");
        assert_eq!(dashboard.customers_by_state[0].location, "SP");
        assert_eq!(dashboard.top_monetary[0].seller_id, "S1");
    }

    #[test]
    fn test_filtered_range() {
        let dataset = sample();
        let range = DateRange::new(date(1), date(3)).unwrap();
        let dashboard = build_dashboard(&dataset, Some(range));

        assert_eq!(dashboard.row_count, 3);
        assert_eq!(dashboard.metrics.total_orders, 2);
        assert_eq!(dashboard.daily_orders.len(), 3);
        // S2's last order is the latest in range
        let s1 = dashboard.rfm.iter().find(|r| r.seller_id == "S1").unwrap();
        assert_eq!(s1.recency, 2);
        assert_eq!(dashboard.metrics.avg_recency, 1.0);
    }

    #[test]
    fn test_empty_range() {
        let dataset = sample();
        let range = DateRange::new(date(20), date(25)).unwrap();
        let dashboard = build_dashboard(&dataset, Some(range));

        assert_eq!(dashboard.row_count, 0);
        assert_eq!(dashboard.metrics.total_orders, 0);
        assert_eq!(dashboard.metrics.total_revenue, Decimal::ZERO);
        assert_eq!(dashboard.metrics.avg_recency, 0.0);
        assert_eq!(dashboard.metrics.avg_monetary, Decimal::ZERO);
        assert!(dashboard.daily_orders.is_empty());
        assert!(dashboard.categories.is_empty());
        assert!(dashboard.best_categories.is_empty());
        assert!(dashboard.worst_categories.is_empty());
        assert!(dashboard.customers_by_state.is_empty());
        assert!(dashboard.customers_by_city.is_empty());
        assert!(dashboard.rfm.is_empty());
        assert!(dashboard.top_recency.is_empty());
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_transactions(vec![]);
        let dashboard = build_dashboard(&dataset, dataset.date_bounds());
        assert_eq!(dashboard.range, None);
        assert_eq!(dashboard.metrics.seller_count, 0);
    }

    #[test]
    fn test_serializes_decimals_as_strings() {
        let dataset = sample();
        let dashboard = build_dashboard(&dataset, None);
        let json = serde_json::to_value(&dashboard).unwrap();

        assert_eq!(json["metrics"]["total_revenue"], "50");
        assert_eq!(json["daily_orders"][0]["date"], "2023-01-01");
        assert_eq!(json["daily_orders"][0]["revenue"], "25");
    }
}
