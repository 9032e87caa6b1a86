use cleanfi_core::{CanonicalTransaction, Money, TransactionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::csv::{RawRow, RawTable};
use crate::schema::{resolve, ColumnMapping, Field, SchemaError};
use crate::util::{header_words, parse_amount, parse_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowIssue {
    InvalidDate(String),
    InvalidAmount(String),
    EmptyDescription,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::InvalidDate(raw) => write!(f, "invalid date '{raw}'"),
            RowIssue::InvalidAmount(raw) => write!(f, "invalid amount '{raw}'"),
            RowIssue::EmptyDescription => write!(f, "empty description"),
        }
    }
}

/// A row left out of the cleaned output, with every reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRow {
    /// 1-based position among the non-blank data rows; blank records are
    /// dropped by the reader before counting.
    pub row: usize,
    pub issues: Vec<RowIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub mapping: ColumnMapping,
    pub transactions: Vec<CanonicalTransaction>,
    pub invalid: Vec<InvalidRow>,
    pub source_rows: usize,
}

impl Normalized {
    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }
}

/// Maps a statement's type label onto a [`TransactionKind`].
pub fn normalize_kind(raw: &str) -> Option<TransactionKind> {
    let label = raw.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    let exact = match label.as_str() {
        "debit" | "debit card" | "purchase" | "dr" => Some(TransactionKind::Debit),
        "credit" | "cr" | "refund" => Some(TransactionKind::Credit),
        "deposit" | "dep" | "atm deposit" => Some(TransactionKind::Deposit),
        "withdrawal" | "withd" | "atm withdrawal" | "cash withdrawal" | "atm" => {
            Some(TransactionKind::Withdrawal)
        }
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    let words = header_words(&label);
    let has = |w: &str| words.iter().any(|x| x == w);
    if has("debit") {
        Some(TransactionKind::Debit)
    } else if has("credit") {
        Some(TransactionKind::Credit)
    } else if has("deposit") {
        Some(TransactionKind::Deposit)
    } else if has("withdraw") || has("withdrawal") {
        Some(TransactionKind::Withdrawal)
    } else {
        Some(TransactionKind::Other(title_case(raw.trim())))
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn cell(row: &RawRow, mapping: &ColumnMapping, field: Field) -> Option<String> {
    mapping
        .get(field)
        .and_then(|i| row.cell(i))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn row_amount(row: &RawRow, mapping: &ColumnMapping) -> Result<Money, RowIssue> {
    if !mapping.has_split_amount() {
        let raw = cell(row, mapping, Field::Amount).unwrap_or_default();
        return parse_amount(&raw).ok_or(RowIssue::InvalidAmount(raw));
    }

    let debit = cell(row, mapping, Field::Debit);
    let credit = cell(row, mapping, Field::Credit);
    if debit.is_none() && credit.is_none() {
        return Err(RowIssue::InvalidAmount(String::new()));
    }
    let side = |raw: Option<String>| -> Result<Money, RowIssue> {
        match raw {
            None => Ok(Money::zero()),
            Some(raw) => parse_amount(&raw)
                .map(Money::abs)
                .ok_or(RowIssue::InvalidAmount(raw)),
        }
    };
    Ok(side(credit)? - side(debit)?)
}

fn normalize_row(
    row: &RawRow,
    mapping: &ColumnMapping,
) -> Result<CanonicalTransaction, Vec<RowIssue>> {
    let mut issues = Vec::new();

    let raw_date = cell(row, mapping, Field::Date).unwrap_or_default();
    let date = parse_date(&raw_date);
    if date.is_none() {
        issues.push(RowIssue::InvalidDate(raw_date));
    }

    let description = cell(row, mapping, Field::Description).unwrap_or_default();
    if description.is_empty() {
        issues.push(RowIssue::EmptyDescription);
    }

    let amount = row_amount(row, mapping).map_err(|issue| issues.push(issue)).ok();

    let (Some(date), Some(amount)) = (date, amount) else {
        return Err(issues);
    };
    if !issues.is_empty() {
        return Err(issues);
    }

    let mut tx = CanonicalTransaction::new(date, &description, amount);
    tx.balance = cell(row, mapping, Field::Balance).and_then(|raw| parse_amount(&raw));
    tx.kind = match cell(row, mapping, Field::Type) {
        Some(raw) => normalize_kind(&raw),
        None => TransactionKind::infer(amount),
    };
    tx.source_category = cell(row, mapping, Field::Category);
    Ok(tx)
}

/// Resolves the column mapping and turns every row into a transaction or an
/// [`InvalidRow`]. Only a missing required column is an error.
pub fn normalize(table: &RawTable) -> Result<Normalized, SchemaError> {
    let mapping = resolve(&table.headers)?;

    let mut transactions = Vec::with_capacity(table.rows.len());
    let mut invalid = Vec::new();
    for (i, row) in table.rows.iter().enumerate() {
        match normalize_row(row, &mapping) {
            Ok(tx) => transactions.push(tx),
            Err(issues) => {
                tracing::debug!(row = i + 1, ?issues, "excluding row");
                invalid.push(InvalidRow { row: i + 1, issues });
            }
        }
    }

    if !invalid.is_empty() {
        tracing::warn!(
            invalid = invalid.len(),
            total = table.rows.len(),
            "rows excluded during normalization"
        );
    }

    Ok(Normalized {
        mapping,
        transactions,
        invalid,
        source_rows: table.rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::read_table;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap())
    }

    fn run(data: &str) -> Normalized {
        normalize(&read_table(data.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn starbucks_example() {
        let n = run("Txn Date,Memo,Amt\n2024-01-05,STARBUCKS #123,-4.50\n");
        assert_eq!(n.transactions.len(), 1);
        let tx = &n.transactions[0];
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(tx.description, "STARBUCKS #123");
        assert_eq!(tx.amount, money("-4.50"));
        assert_eq!(tx.category, None);
        assert_eq!(tx.kind, Some(TransactionKind::Debit));
    }

    #[test]
    fn invalid_rows_are_counted_not_dropped() {
        let n = run(
            "Date,Description,Amount\n\
             2024-01-05,LUNCH,(12.00)\n\
             2024-01-06,MYSTERY,abc\n\
             someday,,\n\
             2024-01-07,   ,5.00\n",
        );
        assert_eq!(n.source_rows, 4);
        assert_eq!(n.transactions.len(), 1);
        assert_eq!(n.transactions[0].amount, money("-12.00"));
        assert_eq!(n.invalid_count(), 3);
        assert_eq!(
            n.invalid[0],
            InvalidRow {
                row: 2,
                issues: vec![RowIssue::InvalidAmount("abc".to_string())],
            }
        );
        assert_eq!(
            n.invalid[1].issues,
            vec![
                RowIssue::InvalidDate("someday".to_string()),
                RowIssue::EmptyDescription,
                RowIssue::InvalidAmount(String::new()),
            ]
        );
        assert_eq!(n.invalid[2].issues, vec![RowIssue::EmptyDescription]);
        assert_eq!(n.transactions.len() + n.invalid_count(), n.source_rows);
    }

    #[test]
    fn description_is_trimmed() {
        let n = run("Date,Description,Amount\n2024-01-05,  RENT  ,-1200\n");
        assert_eq!(n.transactions[0].description, "RENT");
    }

    #[test]
    fn optional_columns_are_carried() {
        let n = run(
            "Posting Date,Payee,Amount,Running Bal.,Type,Category\n\
             01/15/2025,ACME PAYROLL,\"2,500.00\",\"3,450.00\",DEP,Salary\n\
             01/16/2025,ADOBE,-50.00,bad,Check,\n",
        );
        let first = &n.transactions[0];
        assert_eq!(first.balance, Some(money("3450")));
        assert_eq!(first.kind, Some(TransactionKind::Deposit));
        assert_eq!(first.source_category.as_deref(), Some("Salary"));

        let second = &n.transactions[1];
        assert_eq!(second.balance, None);
        assert_eq!(second.kind, Some(TransactionKind::Other("Check".to_string())));
        assert_eq!(second.source_category, None);
    }

    #[test]
    fn split_debit_credit_columns() {
        let n = run(
            "Date,Description,Debit,Credit\n\
             2024-01-15,PAYMENT,,100.00\n\
             2024-01-16,CHARGE,50.00,\n\
             2024-01-17,EMPTY,,\n",
        );
        assert_eq!(n.transactions.len(), 2);
        assert_eq!(n.transactions[0].amount, money("100"));
        assert_eq!(n.transactions[1].amount, money("-50"));
        assert_eq!(n.invalid[0].row, 3);
    }

    #[test]
    fn withdrawal_and_deposit_amount_columns() {
        let n = run(
            "Date,Description,Withdrawal Amount,Deposit Amount\n\
             2024-01-05,STARBUCKS,4.50,\n\
             2024-01-06,PAYROLL,,2500.00\n",
        );
        assert_eq!(n.invalid_count(), 0);
        assert_eq!(n.transactions.len(), 2);
        assert_eq!(n.transactions[0].amount, money("-4.50"));
        assert_eq!(n.transactions[0].kind, Some(TransactionKind::Debit));
        assert_eq!(n.transactions[1].amount, money("2500"));
    }

    #[test]
    fn row_numbers_skip_blank_records() {
        let n = run(
            "Date,Description,Amount\n\
             2024-01-05,LUNCH,-12\n\
             ,,\n\
             2024-01-06,MYSTERY,abc\n",
        );
        assert_eq!(n.source_rows, 2);
        assert_eq!(n.invalid[0].row, 2);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let table = read_table(b"Memo,Amt\nX,1\n").unwrap();
        let err = normalize(&table).unwrap_err();
        let SchemaError::MissingColumns { missing, .. } = err;
        assert_eq!(missing, vec![Field::Date]);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(normalize_kind("Debit Card"), Some(TransactionKind::Debit));
        assert_eq!(normalize_kind("CR"), Some(TransactionKind::Credit));
        assert_eq!(normalize_kind("ATM"), Some(TransactionKind::Withdrawal));
        assert_eq!(normalize_kind("Mobile Deposit"), Some(TransactionKind::Deposit));
        assert_eq!(normalize_kind("POS DEBIT"), Some(TransactionKind::Debit));
        assert_eq!(
            normalize_kind("online transfer"),
            Some(TransactionKind::Other("Online Transfer".to_string()))
        );
        assert_eq!(normalize_kind("  "), None);
    }
}
