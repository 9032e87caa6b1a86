pub mod csv;
pub mod export;
pub mod normalize;
pub mod rules;
pub mod schema;
pub(crate) mod util;

pub use csv::{read_table, CsvError, RawRow, RawTable};
pub use export::{to_csv_bytes, write_csv, ExportError, ExportLayout, ExportOptions};
pub use normalize::{normalize, normalize_kind, InvalidRow, Normalized, RowIssue};
pub use rules::{Categorizer, CategoryOverride, CategoryOverrides};
pub use schema::{auto_map, resolve, ColumnMapping, Field, SchemaError};
pub use util::{parse_amount, parse_date};

pub mod import {
    use crate::*;

    /// Reads and normalizes an uploaded statement in one step.
    pub fn import_csv(data: &[u8]) -> Result<(RawTable, Normalized), ImportError> {
        let table = read_table(data)?;
        let normalized = normalize(&table)?;
        tracing::info!(
            valid = normalized.transactions.len(),
            invalid = normalized.invalid_count(),
            "imported CSV"
        );
        Ok((table, normalized))
    }

    #[derive(thiserror::Error, Debug)]
    pub enum ImportError {
        #[error(transparent)]
        Csv(#[from] CsvError),
        #[error(transparent)]
        Schema(#[from] SchemaError),
    }
}
