//! Domain models for the analytics pipeline.
//!
//! - [`Transaction`] - One denormalized order-item row
//! - [`Dataset`] - Immutable, shareable handle on the loaded rows
//! - [`DateRange`] - Inclusive calendar-day filter window
//! - [`DailyOrders`], [`CategoryQuantity`], [`LocationCount`], [`RfmRow`] - derived view rows

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{FilterError, FilterResult};

// =============================================================================
// Transaction
// =============================================================================

/// One row of the input table: an order item joined with its order,
/// product and seller.
///
/// `order_id` is not unique per row; an order with three items has three rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub order_id: String,
    pub order_approved_at: NaiveDateTime,
    pub price: Decimal,
    pub product_category_name: Option<String>,
    pub seller_id: String,
    pub seller_state: String,
    pub seller_city: String,
}

impl Transaction {
    /// Calendar day of approval.
    pub fn approved_date(&self) -> NaiveDate {
        self.order_approved_at.date()
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive `[start, end]` window of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> FilterResult<Self> {
        if start > end {
            return Err(FilterError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse_date(value: &str) -> FilterResult<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| FilterError::InvalidDate(value.to_string()))
    }

    /// Resolve optional start/end strings against default bounds.
    ///
    /// A missing side falls back to the matching side of `defaults`. When the
    /// given side lies beyond the other default, the range collapses to that
    /// single day instead of inverting.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        defaults: Option<DateRange>,
    ) -> FilterResult<Option<Self>> {
        let start = start.map(Self::parse_date).transpose()?;
        let end = end.map(Self::parse_date).transpose()?;

        match (start, end, defaults) {
            (Some(s), Some(e), _) => Self::new(s, e).map(Some),
            (Some(s), None, Some(d)) => Self::new(s, d.end.max(s)).map(Some),
            (None, Some(e), Some(d)) => Self::new(d.start.min(e), e).map(Some),
            (None, None, d) => Ok(d),
            (Some(s), None, None) => Self::new(s, s).map(Some),
            (None, Some(e), None) => Self::new(e, e).map(Some),
        }
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersect with `bounds`. `None` when the two do not overlap.
    pub fn clamp_to(&self, bounds: &DateRange) -> Option<DateRange> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Number of calendar days covered.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Metadata gathered while loading the CSV.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    /// Rows dropped because they had no approval timestamp.
    pub skipped_rows: usize,
}

/// Loaded transaction table.
///
/// Cloning is cheap: rows sit behind an `Arc` and are never mutated after
/// load, so one handle can be shared by every request.
#[derive(Debug, Clone)]
pub struct Dataset {
    transactions: Arc<[Transaction]>,
    info: LoadInfo,
}

impl Dataset {
    pub fn new(transactions: Vec<Transaction>, info: LoadInfo) -> Self {
        Self {
            transactions: transactions.into(),
            info,
        }
    }

    /// Dataset built in memory, without file metadata.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let info = LoadInfo {
            encoding: "utf-8".to_string(),
            delimiter: ',',
            row_count: transactions.len(),
            ..LoadInfo::default()
        };
        Self::new(transactions, info)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn info(&self) -> &LoadInfo {
        &self.info
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// First and last approval dates. `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let mut dates = self.transactions.iter().map(Transaction::approved_date);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange { start, end })
    }
}

// =============================================================================
// Derived Views
// =============================================================================

/// One day of the order time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyOrders {
    pub date: NaiveDate,
    /// Distinct orders approved that day.
    pub order_count: usize,
    pub revenue: Decimal,
}

/// Row count for one product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryQuantity {
    pub category: String,
    pub quantity: usize,
}

/// Row count for one seller location (state or city).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationCount {
    pub location: String,
    pub customer_count: usize,
}

/// Recency / Frequency / Monetary metrics for one seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RfmRow {
    pub seller_id: String,
    /// Days between the dataset's latest approval date and this seller's.
    pub recency: i64,
    /// Distinct orders.
    pub frequency: usize,
    /// Sum of item prices.
    pub monetary: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(order_id: &str, day: u32) -> Transaction {
        Transaction {
            order_id: order_id.to_string(),
            order_approved_at: date(2023, 1, day).and_hms_opt(12, 0, 0).unwrap(),
            price: Decimal::new(1000, 2),
            product_category_name: None,
            seller_id: "S1".to_string(),
            seller_state: "SP".to_string(),
            seller_city: "sao paulo".to_string(),
        }
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let err = DateRange::new(date(2023, 2, 1), date(2023, 1, 1)).unwrap_err();
        assert!(matches!(err, FilterError::InvertedRange { .. }));
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2023, 1, 5), date(2023, 1, 5)).unwrap();
        assert!(range.contains(date(2023, 1, 5)));
        assert!(!range.contains(date(2023, 1, 6)));
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_resolve_uses_defaults() {
        let defaults = DateRange::new(date(2023, 1, 1), date(2023, 1, 31)).unwrap();

        let range = DateRange::resolve(Some("2023-01-10"), None, Some(defaults))
            .unwrap()
            .unwrap();
        assert_eq!(range.start, date(2023, 1, 10));
        assert_eq!(range.end, date(2023, 1, 31));

        let range = DateRange::resolve(None, None, Some(defaults)).unwrap();
        assert_eq!(range, Some(defaults));

        assert_eq!(DateRange::resolve(None, None, None).unwrap(), None);
    }

    #[test]
    fn test_resolve_open_side_past_bounds() {
        let defaults = DateRange::new(date(2023, 1, 1), date(2023, 1, 31)).unwrap();

        let late = DateRange::resolve(Some("2030-01-01"), None, Some(defaults))
            .unwrap()
            .unwrap();
        assert_eq!(late, DateRange { start: date(2030, 1, 1), end: date(2030, 1, 1) });
        assert_eq!(late.clamp_to(&defaults), None);

        let early = DateRange::resolve(None, Some("2020-06-15"), Some(defaults))
            .unwrap()
            .unwrap();
        assert_eq!(early, DateRange { start: date(2020, 6, 15), end: date(2020, 6, 15) });
    }

    #[test]
    fn test_resolve_bad_date() {
        let err = DateRange::resolve(Some("01/02/2023"), None, None).unwrap_err();
        assert_eq!(err, FilterError::InvalidDate("01/02/2023".into()));
    }

    #[test]
    fn test_clamp_to() {
        let bounds = DateRange::new(date(2023, 1, 1), date(2023, 1, 31)).unwrap();
        let wide = DateRange::new(date(2022, 12, 1), date(2023, 1, 15)).unwrap();
        assert_eq!(
            wide.clamp_to(&bounds),
            Some(DateRange { start: date(2023, 1, 1), end: date(2023, 1, 15) })
        );

        let outside = DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(outside.clamp_to(&bounds), None);
    }

    #[test]
    fn test_dataset_bounds() {
        let dataset = Dataset::from_transactions(vec![tx("o2", 9), tx("o1", 3), tx("o3", 20)]);
        let bounds = dataset.date_bounds().unwrap();
        assert_eq!(bounds.start, date(2023, 1, 3));
        assert_eq!(bounds.end, date(2023, 1, 20));
        assert_eq!(dataset.info().row_count, 3);
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        let dataset = Dataset::from_transactions(vec![]);
        assert!(dataset.is_empty());
        assert_eq!(dataset.date_bounds(), None);
    }
}
