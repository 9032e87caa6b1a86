use cleanfi_core::{
    default_rules, CanonicalTransaction, CategoryRule, SourceCategoryPolicy, TransactionKey,
    UNCATEGORIZED,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::util::normalize_text;

/// One manual edit as it appears in serialized [`CategoryOverrides`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub key: TransactionKey,
    pub category: String,
}

/// Manual category edits, keyed by transaction identity. Serializes as a list
/// of [`CategoryOverride`] entries since the key is not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CategoryOverride>", into = "Vec<CategoryOverride>")]
pub struct CategoryOverrides(BTreeMap<TransactionKey, String>);

impl From<Vec<CategoryOverride>> for CategoryOverrides {
    fn from(entries: Vec<CategoryOverride>) -> Self {
        Self(entries.into_iter().map(|e| (e.key, e.category)).collect())
    }
}

impl From<CategoryOverrides> for Vec<CategoryOverride> {
    fn from(overrides: CategoryOverrides) -> Self {
        overrides
            .0
            .into_iter()
            .map(|(key, category)| CategoryOverride { key, category })
            .collect()
    }
}

impl CategoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous override for `key`, if any.
    pub fn set(&mut self, key: TransactionKey, category: &str) -> Option<String> {
        self.0.insert(key, category.to_string())
    }

    pub fn remove(&mut self, key: &TransactionKey) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &TransactionKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TransactionKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

struct CompiledRule {
    rule: CategoryRule,
    needle: String,
}

/// Ordered keyword rules; the first rule whose normalized keyword occurs in
/// the normalized description wins.
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let compiled = rules
            .into_iter()
            .filter_map(|rule| {
                let needle = normalize_text(&rule.keyword);
                if needle.is_empty() {
                    tracing::warn!(keyword = %rule.keyword, "skipping rule with empty keyword");
                    return None;
                }
                Some(CompiledRule { rule, needle })
            })
            .collect();
        Self { rules: compiled }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_rules())
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter().map(|cr| &cr.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn find_matching_rule(&self, description: &str) -> Option<&CategoryRule> {
        let text = normalize_text(description);
        self.rules
            .iter()
            .find(|cr| text.contains(&cr.needle))
            .map(|cr| &cr.rule)
    }

    pub fn category_for(&self, description: &str) -> &str {
        self.find_matching_rule(description)
            .map(|r| r.category.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Assigns a category to every transaction. Overrides beat everything,
    /// then the source column (when the policy allows), then keyword rules.
    pub fn categorize(
        &self,
        transactions: &[CanonicalTransaction],
        overrides: &CategoryOverrides,
        policy: SourceCategoryPolicy,
    ) -> Vec<CanonicalTransaction> {
        transactions
            .iter()
            .map(|tx| {
                let source = match policy {
                    SourceCategoryPolicy::PreferSource => tx
                        .source_category
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty()),
                    SourceCategoryPolicy::Ignore => None,
                };
                let category = overrides
                    .get(&tx.key())
                    .or(source)
                    .unwrap_or_else(|| self.category_for(&tx.description));
                let mut out = tx.clone();
                out.category = Some(category.to_string());
                out
            })
            .collect()
    }
}
