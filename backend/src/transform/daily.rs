//! Daily order time series.
//!
//! Rows are bucketed by approval date. Every day between the first and last
//! bucket is emitted, days without orders as zero, so the series can be
//! plotted without gaps.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use crate::models::{DailyOrders, Transaction};

#[derive(Default)]
struct DayBucket<'a> {
    orders: HashSet<&'a str>,
    revenue: Decimal,
}

/// Distinct orders and summed revenue per day, ascending, gaps zero-filled.
pub fn daily_orders(transactions: &[Transaction]) -> Vec<DailyOrders> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for tx in transactions {
        let bucket = buckets.entry(tx.approved_date()).or_default();
        if !tx.order_id.is_empty() {
            bucket.orders.insert(tx.order_id.as_str());
        }
        bucket.revenue += tx.price;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|date| match buckets.remove(&date) {
            Some(bucket) => DailyOrders {
                date,
                order_count: bucket.orders.len(),
                revenue: bucket.revenue,
            },
            None => DailyOrders {
                date,
                order_count: 0,
                revenue: Decimal::ZERO,
            },
        })
        .collect()
}

/// Sum of `order_count` over the series.
pub fn total_orders(series: &[DailyOrders]) -> usize {
    series.iter().map(|d| d.order_count).sum()
}

/// Sum of `revenue` over the series.
pub fn total_revenue(series: &[DailyOrders]) -> Decimal {
    series.iter().map(|d| d.revenue).sum()
}
