use cleanfi_core::{
    expense_breakdown, CanonicalTransaction, CategoryTotal, KeyMetrics, SummaryStats,
    TransactionKey,
};
use cleanfi_import::InvalidRow;
use serde::Serialize;
use std::fmt::Write;

use crate::error::SessionError;

/// Everything the UI shows after an upload or an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub transactions: Vec<CanonicalTransaction>,
    pub invalid_rows: Vec<InvalidRow>,
    pub source_rows: usize,
    pub stats: SummaryStats,
    pub progress: f64,
    pub expense_breakdown: Vec<CategoryTotal>,
    pub key_metrics: KeyMetrics,
    pub category_options: Vec<String>,
}

impl SessionView {
    pub(crate) fn build(
        transactions: Vec<CanonicalTransaction>,
        invalid_rows: Vec<InvalidRow>,
        source_rows: usize,
        excluded: &[String],
        category_options: Vec<String>,
    ) -> Self {
        let stats = SummaryStats::compute(&transactions);
        let breakdown = expense_breakdown(&transactions, excluded);
        let key_metrics = KeyMetrics::compute(&transactions, &breakdown);
        SessionView {
            progress: stats.progress(),
            stats,
            expense_breakdown: breakdown,
            key_metrics,
            transactions,
            invalid_rows,
            source_rows,
            category_options,
        }
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_rows.len()
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A transaction formatted for the table widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub key: TransactionKey,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub category: String,
}

impl DisplayRow {
    /// Falls back to ISO dates when `date_format` cannot render a date.
    pub fn new(tx: &CanonicalTransaction, date_format: &str) -> Self {
        let mut date = String::new();
        if write!(date, "{}", tx.date.format(date_format)).is_err() {
            date = tx.date.format("%Y-%m-%d").to_string();
        }
        DisplayRow {
            key: tx.key(),
            date,
            description: tx.description.clone(),
            amount: tx.amount.to_string(),
            category: tx.category_or_uncategorized().to_string(),
        }
    }
}
