use cleanfi_core::{
    category_names, CanonicalTransaction, CleanerConfig, TransactionKey, UNCATEGORIZED,
};
use cleanfi_import::import::import_csv;
use cleanfi_import::{
    to_csv_bytes, Categorizer, CategoryOverrides, ExportLayout, ExportOptions, Field, Normalized,
    RawTable,
};
use serde::Serialize;
use std::path::Path;

use crate::error::SessionError;
use crate::view::{DisplayRow, SessionView};

struct Upload {
    table: RawTable,
    normalized: Normalized,
}

/// What came out of reading a file, before any categorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub source_rows: usize,
    pub valid: usize,
    pub invalid: usize,
    /// `(canonical field, source header)` for every mapped column.
    pub columns: Vec<(Field, String)>,
}

/// One user's working state: the active upload and their manual edits.
pub struct Session {
    config: CleanerConfig,
    categorizer: Categorizer,
    upload: Option<Upload>,
    overrides: CategoryOverrides,
}

impl Default for Session {
    fn default() -> Self {
        let config = CleanerConfig::default();
        Session {
            categorizer: Categorizer::new(config.rule_table()),
            config,
            upload: None,
            overrides: CategoryOverrides::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CleanerConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let categorizer = Categorizer::new(config.rule_table());
        tracing::debug!(rules = categorizer.len(), "session created");
        Ok(Session {
            config,
            categorizer,
            upload: None,
            overrides: CategoryOverrides::new(),
        })
    }

    pub fn from_config_file(path: &Path) -> Result<Self, SessionError> {
        Self::with_config(CleanerConfig::load(path)?)
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    pub fn has_upload(&self) -> bool {
        self.upload.is_some()
    }

    /// Replaces the active upload and drops every override. On error the
    /// session is left without an upload.
    pub fn upload(&mut self, data: &[u8]) -> Result<UploadReport, SessionError> {
        self.upload = None;
        self.overrides.clear();

        let (table, normalized) = import_csv(data)?;
        let report = UploadReport {
            source_rows: normalized.source_rows,
            valid: normalized.transactions.len(),
            invalid: normalized.invalid_count(),
            columns: normalized
                .mapping
                .assignments()
                .into_iter()
                .map(|(field, header)| (field, header.to_string()))
                .collect(),
        };
        tracing::info!(
            rows = report.source_rows,
            valid = report.valid,
            invalid = report.invalid,
            "upload accepted"
        );
        self.upload = Some(Upload { table, normalized });
        Ok(report)
    }

    fn active(&self) -> Result<&Upload, SessionError> {
        self.upload.as_ref().ok_or(SessionError::NoUpload)
    }

    /// Pins `key` to `category`, returning the override it replaced.
    pub fn set_category(
        &mut self,
        key: &TransactionKey,
        category: &str,
    ) -> Result<Option<String>, SessionError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(SessionError::EmptyCategory);
        }
        let upload = self.active()?;
        if !upload.normalized.transactions.iter().any(|tx| tx.key() == *key) {
            return Err(SessionError::UnknownTransaction(key.clone()));
        }
        tracing::debug!(%key, category, "category override set");
        Ok(self.overrides.set(key.clone(), category))
    }

    pub fn clear_category(&mut self, key: &TransactionKey) -> Option<String> {
        self.overrides.remove(key)
    }

    pub fn overrides(&self) -> &CategoryOverrides {
        &self.overrides
    }

    /// Categorizes the current upload from scratch with the active overrides.
    pub fn transactions(&self) -> Vec<CanonicalTransaction> {
        match &self.upload {
            Some(upload) => self.categorizer.categorize(
                &upload.normalized.transactions,
                &self.overrides,
                self.config.source_category,
            ),
            None => Vec::new(),
        }
    }

    pub fn view(&self) -> SessionView {
        let transactions = self.transactions();
        let (invalid_rows, source_rows) = match &self.upload {
            Some(upload) => (upload.normalized.invalid.clone(), upload.normalized.source_rows),
            None => (Vec::new(), 0),
        };
        SessionView::build(
            transactions,
            invalid_rows,
            source_rows,
            &self.config.excluded_expense_categories,
            self.category_options(),
        )
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.transactions()
            .iter()
            .map(|tx| DisplayRow::new(tx, &self.config.display_date_format))
            .collect()
    }

    pub fn download(&self) -> Result<Vec<u8>, SessionError> {
        self.download_with(ExportLayout::Canonical)
    }

    pub fn download_with(&self, layout: ExportLayout) -> Result<Vec<u8>, SessionError> {
        self.active()?;
        let options = ExportOptions {
            fraction_digits: self.config.fraction_digits,
            layout,
        };
        Ok(to_csv_bytes(&self.transactions(), &options)?)
    }

    pub fn raw_table(&self) -> Option<&RawTable> {
        self.upload.as_ref().map(|u| &u.table)
    }

    /// Rule categories in table order, then any custom override categories,
    /// then `Uncategorized`.
    pub fn category_options(&self) -> Vec<String> {
        let rules: Vec<_> = self.categorizer.rules().cloned().collect();
        let mut names = category_names(&rules);
        names.pop();
        let mut custom: Vec<&str> = self
            .overrides
            .iter()
            .map(|(_, c)| c)
            .filter(|c| *c != UNCATEGORIZED && !names.iter().any(|n| n == c))
            .collect();
        custom.sort_unstable();
        custom.dedup();
        names.extend(custom.into_iter().map(str::to_string));
        names.push(UNCATEGORIZED.to_string());
        names
    }
}
