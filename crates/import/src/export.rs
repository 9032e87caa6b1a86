use cleanfi_core::CanonicalTransaction;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLayout {
    /// `date,description,amount,category`
    #[default]
    Canonical,
    /// Canonical columns plus `balance,type`.
    Extended,
}

impl ExportLayout {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            ExportLayout::Canonical => &["date", "description", "amount", "category"],
            ExportLayout::Extended => &[
                "date",
                "description",
                "amount",
                "category",
                "balance",
                "type",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub fraction_digits: u32,
    pub layout: ExportLayout,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            fraction_digits: 2,
            layout: ExportLayout::Canonical,
        }
    }
}

fn record(tx: &CanonicalTransaction, options: &ExportOptions) -> Vec<String> {
    let mut fields = vec![
        tx.date.format("%Y-%m-%d").to_string(),
        tx.description.clone(),
        tx.amount.to_fixed(options.fraction_digits),
        tx.category_or_uncategorized().to_string(),
    ];
    if options.layout == ExportLayout::Extended {
        fields.push(
            tx.balance
                .map(|b| b.to_fixed(options.fraction_digits))
                .unwrap_or_default(),
        );
        fields.push(tx.kind.as_ref().map(ToString::to_string).unwrap_or_default());
    }
    fields
}

pub fn write_csv<W: Write>(
    out: W,
    transactions: &[CanonicalTransaction],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(options.layout.header())?;
    for tx in transactions {
        writer.write_record(record(tx, options))?;
    }
    writer.flush()?;
    tracing::debug!(rows = transactions.len(), layout = ?options.layout, "wrote cleaned CSV");
    Ok(())
}

pub fn to_csv_bytes(
    transactions: &[CanonicalTransaction],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, transactions, options)?;
    Ok(buf)
}
