use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

use super::category::{default_rules, CategoryRule, UNCATEGORIZED};

/// Largest number of fraction digits the exporter will print.
pub const MAX_FRACTION_DIGITS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// What to do with a category column that the uploaded file already carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategoryPolicy {
    /// Always categorize by keyword.
    #[default]
    Ignore,
    /// Keep a non-empty source category and only match keywords for the rest.
    PreferSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub fraction_digits: u32,
    pub use_default_rules: bool,
    /// User rules, scanned before the default table.
    pub rules: Vec<CategoryRule>,
    pub source_category: SourceCategoryPolicy,
    pub excluded_expense_categories: Vec<String>,
    /// chrono format string for on-screen dates.
    pub display_date_format: String,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            fraction_digits: 2,
            use_default_rules: true,
            rules: Vec::new(),
            source_category: SourceCategoryPolicy::default(),
            excluded_expense_categories: vec![
                "Transfer".to_string(),
                "ATM & Cash".to_string(),
                UNCATEGORIZED.to_string(),
            ],
            display_date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

/// True if `format` renders a bare date; time fields such as `%H` do not.
pub fn formats_dates(format: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap_or_default();
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).is_ok()
}

impl CleanerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: CleanerConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fraction_digits > MAX_FRACTION_DIGITS {
            return Err(ConfigError::Invalid(format!(
                "fraction_digits must be at most {MAX_FRACTION_DIGITS}, got {}",
                self.fraction_digits
            )));
        }
        if !formats_dates(&self.display_date_format) {
            return Err(ConfigError::Invalid(format!(
                "display_date_format '{}' is not a valid date format",
                self.display_date_format
            )));
        }
        if let Some(rule) = self.rules.iter().find(|r| r.category.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "rule for keyword '{}' has an empty category",
                rule.keyword
            )));
        }
        Ok(())
    }

    /// The effective rule sequence: user rules, then the defaults if enabled.
    pub fn rule_table(&self) -> Vec<CategoryRule> {
        let mut rules = self.rules.clone();
        if self.use_default_rules {
            rules.extend(default_rules());
        }
        rules
    }
}
