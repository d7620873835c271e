//! Customer counts by seller location.
//!
//! Each row counts once toward its seller's state and city. Rows with an
//! empty location are left out of that grouping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{LocationCount, Transaction};

/// Location granularity for [`customer_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    State,
    City,
}

impl LocationLevel {
    fn key<'a>(&self, tx: &'a Transaction) -> &'a str {
        match self {
            Self::State => tx.seller_state.as_str(),
            Self::City => tx.seller_city.as_str(),
        }
    }
}

impl fmt::Display for LocationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::City => write!(f, "city"),
        }
    }
}

/// Rows per location, ordered by location name.
pub fn customer_count(transactions: &[Transaction], level: LocationLevel) -> Vec<LocationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for tx in transactions {
        let location = level.key(tx);
        if !location.is_empty() {
            *counts.entry(location).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(location, customer_count)| LocationCount {
            location: location.to_string(),
            customer_count,
        })
        .collect()
}

pub fn by_state(transactions: &[Transaction]) -> Vec<LocationCount> {
    customer_count(transactions, LocationLevel::State)
}

pub fn by_city(transactions: &[Transaction]) -> Vec<LocationCount> {
    customer_count(transactions, LocationLevel::City)
}

/// Reorder by count, largest first (chart order). Stable for equal counts.
pub fn sort_by_count(mut counts: Vec<LocationCount>) -> Vec<LocationCount> {
    counts.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));
    counts
}
