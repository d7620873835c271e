//! Date-range selection.
//!
//! Both ends are inclusive calendar days: a row approved at 23:59 on `end`
//! is kept.

use crate::models::{Dataset, DateRange, Transaction};

/// Rows whose approval date lies in `range`.
pub fn filter_transactions(transactions: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| range.contains(tx.approved_date()))
        .cloned()
        .collect()
}

/// Select rows from a dataset. `None` keeps every row.
pub fn filter_by_date(dataset: &Dataset, range: Option<&DateRange>) -> Vec<Transaction> {
    match range {
        Some(range) => filter_transactions(dataset.transactions(), range),
        None => dataset.transactions().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(order_id: &str, ts: &str) -> Transaction {
        Transaction {
            order_id: order_id.to_string(),
            order_approved_at: crate::parser::parse_timestamp(ts).unwrap(),
            price: Decimal::ONE,
            product_category_name: None,
            seller_id: "S1".to_string(),
            seller_state: "SP".to_string(),
            seller_city: "campinas".to_string(),
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            DateRange::parse_date(start).unwrap(),
            DateRange::parse_date(end).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_end_day_is_inclusive() {
        let rows = vec![
            tx("o1", "2023-01-01 00:00:00"),
            tx("o2", "2023-01-05 23:59:59"),
            tx("o3", "2023-01-06 00:00:00"),
        ];
        let kept = filter_transactions(&rows, &range("2023-01-01", "2023-01-05"));
        let ids: Vec<_> = kept.iter().map(|t| t.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2"]);
    }

    #[test]
    fn test_range_outside_data_is_empty() {
        let rows = vec![tx("o1", "2023-01-01 10:00:00")];
        assert!(filter_transactions(&rows, &range("2024-01-01", "2024-12-31")).is_empty());
    }

    #[test]
    fn test_no_range_keeps_all() {
        let dataset = Dataset::from_transactions(vec![
            tx("o1", "2023-01-01 10:00:00"),
            tx("o2", "2023-03-01 10:00:00"),
        ]);
        assert_eq!(filter_by_date(&dataset, None).len(), 2);

        let march = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(filter_by_date(&dataset, Some(&march)).len(), 1);
    }
}
