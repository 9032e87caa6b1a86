use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::util::{contains_words, header_words, similarity};

/// Canonical columns, in the order they get to claim headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Description,
    Amount,
    Balance,
    Type,
    Category,
    Debit,
    Credit,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Date,
        Field::Description,
        Field::Amount,
        Field::Balance,
        Field::Type,
        Field::Category,
        Field::Debit,
        Field::Credit,
    ];

    pub const REQUIRED: [Field; 3] = [Field::Date, Field::Description, Field::Amount];

    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Balance => "balance",
            Field::Type => "type",
            Field::Category => "category",
            Field::Debit => "debit",
            Field::Credit => "credit",
        }
    }

    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::Date => &[
                "posting date",
                "post date",
                "posted date",
                "transaction date",
                "trans date",
                "txn date",
                "value date",
                "booking date",
            ],
            Field::Description => &[
                "desc",
                "details",
                "memo",
                "payee",
                "narrative",
                "narration",
                "merchant",
                "transaction",
                "name",
            ],
            Field::Amount => &["amt", "transaction amount", "debit/credit", "value"],
            Field::Balance => &[
                "running balance",
                "available balance",
                "running bal",
                "bal",
            ],
            Field::Type => &["transaction type", "credit/debit", "dr/cr", "method"],
            Field::Category => &["categories", "spending category"],
            Field::Debit => &[
                "withdrawal",
                "withdrawals",
                "money out",
                "paid out",
                "debit amount",
                "debit amt",
                "withdrawal amount",
                "withdrawal amt",
                "debits",
            ],
            Field::Credit => &[
                "deposit",
                "deposits",
                "money in",
                "paid in",
                "credit amount",
                "credit amt",
                "deposit amount",
                "deposit amt",
                "credits",
            ],
        }
    }

    pub fn is_required(self) -> bool {
        Field::REQUIRED.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error(
        "Missing required column(s): {} (detected columns: {})",
        join(.missing),
        .detected.join(", ")
    )]
    MissingColumns {
        missing: Vec<Field>,
        detected: Vec<String>,
    },
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which header index feeds each canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    headers: Vec<String>,
    columns: BTreeMap<Field, usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn header(&self, field: Field) -> Option<&str> {
        self.get(field).map(|i| self.headers[i].as_str())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(field, source header)` pairs in field priority order.
    pub fn assignments(&self) -> Vec<(Field, &str)> {
        self.columns
            .iter()
            .map(|(field, &i)| (*field, self.headers[i].as_str()))
            .collect()
    }

    /// A separate debit + credit pair stands in for a missing amount column.
    pub fn has_split_amount(&self) -> bool {
        self.get(Field::Amount).is_none()
            && self.get(Field::Debit).is_some()
            && self.get(Field::Credit).is_some()
    }

    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|&f| self.get(f).is_none())
            .filter(|&f| !(f == Field::Amount && self.has_split_amount()))
            .collect()
    }
}

const FUZZY_THRESHOLD: f32 = 0.8;
const FUZZY_MIN_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tier {
    Name,
    Synonym,
    Contains,
    Fuzzy,
}

const TIERS: [Tier; 4] = [Tier::Name, Tier::Synonym, Tier::Contains, Tier::Fuzzy];

/// In the loose tiers a header that also reads as a debit or credit column
/// ("Withdrawal Amount") is left for the split pair.
fn reserved_for_split(tier: Tier, field: Field, header: &[String]) -> bool {
    field == Field::Amount
        && matches!(tier, Tier::Contains | Tier::Fuzzy)
        && (tier_matches(tier, Field::Debit, header) || tier_matches(tier, Field::Credit, header))
}

fn tier_matches(tier: Tier, field: Field, header: &[String]) -> bool {
    let candidates = std::iter::once(field.name()).chain(field.synonyms().iter().copied());
    match tier {
        Tier::Name => *header == header_words(field.name()),
        Tier::Synonym => field.synonyms().iter().any(|s| *header == header_words(s)),
        Tier::Contains => candidates
            .into_iter()
            .any(|s| contains_words(header, &header_words(s))),
        Tier::Fuzzy => {
            let joined = header.join(" ");
            candidates
                .into_iter()
                .filter(|s| s.len() >= FUZZY_MIN_LEN)
                .any(|s| similarity(&joined, &header_words(s).join(" ")) >= FUZZY_THRESHOLD)
        }
    }
}

/// Maps headers onto canonical fields without failing; see [`resolve`].
///
/// Tiers run in order (exact name, exact synonym, whole-word containment,
/// fuzzy). Within a tier every unmapped field, in priority order, takes the
/// left-most header that is not already claimed.
pub fn auto_map(headers: &[String]) -> ColumnMapping {
    let words: Vec<Vec<String>> = headers.iter().map(|h| header_words(h)).collect();
    let mut columns: BTreeMap<Field, usize> = BTreeMap::new();
    let mut claimed = vec![false; headers.len()];

    for tier in TIERS {
        for field in Field::ALL {
            if columns.contains_key(&field) {
                continue;
            }
            let found = words
                .iter()
                .enumerate()
                .find(|(i, w)| {
                    !claimed[*i]
                        && !w.is_empty()
                        && tier_matches(tier, field, w)
                        && !reserved_for_split(tier, field, w)
                })
                .map(|(i, _)| i);
            if let Some(i) = found {
                tracing::debug!(field = field.name(), header = %headers[i], ?tier, "mapped column");
                claimed[i] = true;
                columns.insert(field, i);
            }
        }
    }

    ColumnMapping {
        headers: headers.to_vec(),
        columns,
    }
}

/// Like [`auto_map`], but a missing date, description or amount is fatal.
pub fn resolve(headers: &[String]) -> Result<ColumnMapping, SchemaError> {
    let mapping = auto_map(headers);
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns {
            missing,
            detected: headers.to_vec(),
        });
    }
    Ok(mapping)
}
