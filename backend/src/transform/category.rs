//! Product category ranking.

use std::collections::HashMap;

use crate::models::{CategoryQuantity, Transaction};

/// Rows per category, most sold first.
///
/// Equal counts are ordered by category name so the ranking is total.
/// Rows without a category are not counted.
pub fn category_quantity(transactions: &[Transaction]) -> Vec<CategoryQuantity> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        if let Some(category) = tx.product_category_name.as_deref() {
            *counts.entry(category).or_default() += 1;
        }
    }

    let mut ranked: Vec<CategoryQuantity> = counts
        .into_iter()
        .map(|(category, quantity)| CategoryQuantity {
            category: category.to_string(),
            quantity,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked
}

/// First `n` entries of a ranking.
pub fn best_performing(ranked: &[CategoryQuantity], n: usize) -> &[CategoryQuantity] {
    &ranked[..n.min(ranked.len())]
}

/// Last `n` entries of a ranking, in ranking order.
pub fn worst_performing(ranked: &[CategoryQuantity], n: usize) -> &[CategoryQuantity] {
    &ranked[ranked.len() - n.min(ranked.len())..]
}
