use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::money::Money;
use super::transaction::CanonicalTransaction;

/// Counts and signed per-category sums over a categorized sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub categorized: usize,
    pub uncategorized: usize,
    pub per_category_totals: BTreeMap<String, Money>,
}

impl SummaryStats {
    pub fn compute(transactions: &[CanonicalTransaction]) -> Self {
        let mut per_category_totals: BTreeMap<String, Money> = BTreeMap::new();
        let mut categorized = 0;

        for tx in transactions {
            if tx.is_categorized() {
                categorized += 1;
            }
            *per_category_totals
                .entry(tx.category_or_uncategorized().to_string())
                .or_default() += tx.amount;
        }

        SummaryStats {
            total: transactions.len(),
            categorized,
            uncategorized: transactions.len() - categorized,
            per_category_totals,
        }
    }

    /// Share of transactions with a real category, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.categorized as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

/// Spending per category as positive totals, largest first. Only outflows
/// count, and categories listed in `excluded` are left out.
pub fn expense_breakdown(
    transactions: &[CanonicalTransaction],
    excluded: &[String],
) -> Vec<CategoryTotal> {
    let mut sums: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let category = tx.category_or_uncategorized();
        if excluded.iter().any(|e| e == category) {
            continue;
        }
        *sums.entry(category).or_default() += tx.amount.abs();
    }

    let mut slices: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    // BTreeMap order already sorts names; a stable sort keeps that for ties.
    slices.sort_by(|a, b| b.total.cmp(&a.total));
    slices
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_income: Money,
    pub total_spent: Money,
    pub top_category: Option<CategoryTotal>,
}

impl KeyMetrics {
    pub fn compute(transactions: &[CanonicalTransaction], breakdown: &[CategoryTotal]) -> Self {
        let total_income = transactions
            .iter()
            .filter(|tx| tx.is_income())
            .map(|tx| tx.amount)
            .sum();
        let total_spent = transactions
            .iter()
            .filter(|tx| tx.is_expense())
            .map(|tx| tx.amount)
            .sum::<Money>()
            .abs();

        KeyMetrics {
            total_income,
            total_spent,
            top_category: breakdown.first().cloned(),
        }
    }
}
