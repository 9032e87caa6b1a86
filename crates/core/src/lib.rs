pub mod category;
pub mod config;
pub mod money;
pub mod summary;
pub mod transaction;

pub use category::{
    category_names, default_rules, CategoryRule, DEFAULT_CATEGORY_RULES, UNCATEGORIZED,
};
pub use config::{formats_dates, CleanerConfig, ConfigError, SourceCategoryPolicy};
pub use money::Money;
pub use summary::{expense_breakdown, CategoryTotal, KeyMetrics, SummaryStats};
pub use transaction::{CanonicalTransaction, TransactionKey, TransactionKind};
