use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::UNCATEGORIZED;
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Debit,
    Credit,
    Deposit,
    Withdrawal,
    Other(String),
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Debit => write!(f, "Debit"),
            TransactionKind::Credit => write!(f, "Credit"),
            TransactionKind::Deposit => write!(f, "Deposit"),
            TransactionKind::Withdrawal => write!(f, "Withdrawal"),
            TransactionKind::Other(label) => write!(f, "{label}"),
        }
    }
}

impl TransactionKind {
    /// Deposits for money in, debits for money out, nothing for zero.
    pub fn infer(amount: Money) -> Option<Self> {
        if amount.is_positive() {
            Some(TransactionKind::Deposit)
        } else if amount.is_negative() {
            Some(TransactionKind::Debit)
        } else {
            None
        }
    }
}

/// Stable identity of a transaction, used to key manual category edits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionKey {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.date, self.description, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    /// `None` until the categorizer has run.
    pub category: Option<String>,
    pub balance: Option<Money>,
    pub kind: Option<TransactionKind>,
    /// Category column carried by the uploaded file, if it had one.
    pub source_category: Option<String>,
}

impl CanonicalTransaction {
    pub fn new(date: NaiveDate, description: &str, amount: Money) -> Self {
        CanonicalTransaction {
            date,
            description: description.to_string(),
            amount,
            category: None,
            balance: None,
            kind: None,
            source_category: None,
        }
    }

    pub fn key(&self) -> TransactionKey {
        TransactionKey {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
        }
    }

    pub fn category_or_uncategorized(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    pub fn is_categorized(&self) -> bool {
        self.category_or_uncategorized() != UNCATEGORIZED
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_transaction_is_uncategorized() {
        let tx =
            CanonicalTransaction::new(date(2024, 1, 5), "STARBUCKS #123", Money::from_cents(-450));
        assert_eq!(tx.category, None);
        assert_eq!(tx.category_or_uncategorized(), "Uncategorized");
        assert!(!tx.is_categorized());
        assert!(tx.is_expense());
        assert!(!tx.is_income());
    }

    #[test]
    fn explicit_uncategorized_is_not_categorized() {
        let mut tx = CanonicalTransaction::new(date(2024, 1, 5), "X", Money::from_cents(100));
        tx.category = Some(UNCATEGORIZED.to_string());
        assert!(!tx.is_categorized());
        tx.category = Some("Income".to_string());
        assert!(tx.is_categorized());
    }

    #[test]
    fn key_ignores_category() {
        let mut a = CanonicalTransaction::new(date(2024, 1, 5), "RENT", Money::from_cents(-120000));
        let b = a.clone();
        a.category = Some("Housing".to_string());
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_display() {
        let tx =
            CanonicalTransaction::new(date(2024, 1, 5), "STARBUCKS #123", Money::from_cents(-450));
        assert_eq!(tx.key().to_string(), "2024-01-05 | STARBUCKS #123 | -$4.50");
    }

    #[test]
    fn infer_kind_from_sign() {
        assert_eq!(TransactionKind::infer(Money::from_cents(1)), Some(TransactionKind::Deposit));
        assert_eq!(TransactionKind::infer(Money::from_cents(-1)), Some(TransactionKind::Debit));
        assert_eq!(TransactionKind::infer(Money::zero()), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(TransactionKind::Withdrawal.to_string(), "Withdrawal");
        assert_eq!(TransactionKind::Other("Check".to_string()).to_string(), "Check");
    }
}
