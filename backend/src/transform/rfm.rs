//! RFM (Recency / Frequency / Monetary) metrics per seller.
//!
//! Recency is measured against the latest approval date in the table being
//! aggregated, not the wall clock, so historical data always yields the
//! same scores.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::{RfmRow, Transaction};

struct SellerAcc<'a> {
    last_date: NaiveDate,
    orders: HashSet<&'a str>,
    monetary: Decimal,
}

/// One row per seller, ordered by seller id.
pub fn rfm(transactions: &[Transaction]) -> Vec<RfmRow> {
    let Some(reference) = transactions.iter().map(Transaction::approved_date).max() else {
        return Vec::new();
    };

    let mut sellers: BTreeMap<&str, SellerAcc> = BTreeMap::new();

    for tx in transactions {
        if tx.seller_id.is_empty() {
            continue;
        }
        let date = tx.approved_date();
        let acc = sellers.entry(tx.seller_id.as_str()).or_insert_with(|| SellerAcc {
            last_date: date,
            orders: HashSet::new(),
            monetary: Decimal::ZERO,
        });

        acc.last_date = acc.last_date.max(date);
        if !tx.order_id.is_empty() {
            acc.orders.insert(tx.order_id.as_str());
        }
        acc.monetary += tx.price;
    }

    sellers
        .into_iter()
        .map(|(seller_id, acc)| RfmRow {
            seller_id: seller_id.to_string(),
            recency: (reference - acc.last_date).num_days(),
            frequency: acc.orders.len(),
            monetary: acc.monetary,
        })
        .collect()
}

/// `n` most recently active sellers (smallest recency first).
pub fn top_by_recency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.recency.cmp(&b.recency).then_with(|| a.seller_id.cmp(&b.seller_id)));
    sorted.truncate(n);
    sorted
}

/// `n` sellers with the most distinct orders.
pub fn top_by_frequency(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.seller_id.cmp(&b.seller_id)));
    sorted.truncate(n);
    sorted
}

/// `n` sellers with the highest revenue.
pub fn top_by_monetary(rows: &[RfmRow], n: usize) -> Vec<RfmRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.monetary.cmp(&a.monetary).then_with(|| a.seller_id.cmp(&b.seller_id)));
    sorted.truncate(n);
    sorted
}

/// Mean RFM values across sellers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RfmAverages {
    /// Days, one decimal.
    pub recency: f64,
    /// Orders, two decimals.
    pub frequency: f64,
    /// Currency, two decimal places.
    pub monetary: Decimal,
}

/// Averages over `rows`; all zero when there are no sellers.
pub fn rfm_averages(rows: &[RfmRow]) -> RfmAverages {
    if rows.is_empty() {
        return RfmAverages {
            recency: 0.0,
            frequency: 0.0,
            monetary: Decimal::ZERO,
        };
    }

    let n = rows.len() as f64;
    let recency = rows.iter().map(|r| r.recency as f64).sum::<f64>() / n;
    let frequency = rows.iter().map(|r| r.frequency as f64).sum::<f64>() / n;
    let monetary = rows.iter().map(|r| r.monetary).sum::<Decimal>() / Decimal::from(rows.len());

    RfmAverages {
        recency: round_to(recency, 1),
        frequency: round_to(frequency, 2),
        monetary: monetary.round_dp(2),
    }
}

/// Round half to even, matching `Decimal::round_dp` on the monetary mean.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
