use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("File has no header row")]
    MissingHeader,
}

/// One data row: source header → raw cell, in file column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Pairs `values` with `headers`; missing trailing cells become empty and
    /// cells beyond the header are dropped.
    pub fn new(headers: &[String], values: &[&str]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), values.get(i).copied().unwrap_or_default().to_string()))
            .collect();
        RawRow { cells }
    }

    /// First cell whose header equals `header`, ignoring case.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h.eq_ignore_ascii_case(header))
            .map(|(_, v)| v.as_str())
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// A whole uploaded file: cleaned headers plus its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// UTF-8 when valid (a leading BOM is dropped), Latin-1 otherwise.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        // Every Latin-1 byte is the Unicode code point of the same value.
        Err(_) => Cow::Owned(data.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Trims a header and collapses runs of inner whitespace to one space.
pub fn clean_header(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"));
    re.replace_all(raw.trim(), " ").into_owned()
}

pub fn read_table(data: &[u8]) -> Result<RawTable, CsvError> {
    let text = decode(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let values: Vec<&str> = record.iter().collect();
        let row = RawRow::new(&headers, &values);
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "read CSV table");
    Ok(RawTable { headers, rows })
}
