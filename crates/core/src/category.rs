use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// A keyword → category pair. Rule tables are scanned in order; the first
/// rule whose keyword occurs in a description decides its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(keyword: &str, category: &str) -> Self {
        CategoryRule {
            keyword: keyword.to_string(),
            category: category.to_string(),
        }
    }
}

/// Seed table of common merchants and keywords, in priority order.
pub const DEFAULT_CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Food & Dining",
        &[
            "restaurant", "cafe", "coffee", "starbucks", "mcdonald", "burger", "pizza",
            "subway", "dining", "food", "grocery", "supermarket", "walmart", "target",
            "costco", "safeway", "kroger", "whole foods", "trader joe", "albertsons",
            "food lion", "publix", "chicken", "tea", "boba", "tst", "cava", "chili's", "kfc",
            "snowdaes", "dunkin", "domino's",
        ],
    ),
    (
        "Transportation",
        &[
            "gas", "gasoline", "fuel", "shell", "exxon", "mobil", "bp", "chevron", "speedway",
            "uber", "lyft", "taxi", "parking", "toll", "metro", "bus", "train", "airline",
            "delta", "united", "american", "southwest", "jetblue", "car rental", "hertz",
            "avis",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon", "ebay", "walmart", "target", "best buy", "home depot", "lowes", "macy",
            "nordstrom", "gap", "old navy", "h&m", "zara", "online", "purchase", "order",
            "uniqlo", "7-eleven", "family dollar", "lowe's", "staples",
        ],
    ),
    (
        "Entertainment",
        &[
            "netflix", "spotify", "hulu", "disney", "youtube", "movie", "cinema", "theater",
            "concert", "ticket", "entertainment", "game", "steam", "playstation", "xbox",
        ],
    ),
    (
        "Healthcare",
        &[
            "hospital", "doctor", "medical", "pharmacy", "cvs", "walgreens", "health",
            "dental", "vision", "insurance", "clinic", "urgent care", "prescription",
            "medication",
        ],
    ),
    (
        "Utilities/Bills",
        &[
            "bill", "electric", "gas", "water", "internet", "phone", "cable", "utility",
            "at&t", "verizon", "tmobile", "sprint", "comcast", "spectrum", "cox", "directv",
            "dish", "openai",
        ],
    ),
    (
        "Income",
        &[
            "payroll", "salary", "wage", "bonus", "commission", "income", "deposit", "refund",
            "interest", "dividend", "investment", "return", "direct dep", "dep",
        ],
    ),
    (
        "ATM & Cash",
        &["atm", "cash", "withdrawal", "deposit", "bank", "branch"],
    ),
    (
        "Insurance",
        &[
            "insurance", "premium", "coverage", "policy", "auto insurance", "home insurance",
            "life insurance", "health insurance",
        ],
    ),
    (
        "Education",
        &[
            "school", "university", "college", "tuition", "education", "student", "book",
            "textbook", "course", "class",
        ],
    ),
    (
        "Travel",
        &[
            "hotel", "airbnb", "booking", "expedia", "priceline", "travel", "vacation",
            "flight", "cruise", "resort",
        ],
    ),
    (
        "Subscriptions",
        &["subscription", "monthly", "annual", "recurring", "membership", "premium"],
    ),
    ("Transfer", &["transfer", "xfer from", "xfer to"]),
];

/// Flattens [`DEFAULT_CATEGORY_RULES`] into an ordered rule sequence.
pub fn default_rules() -> Vec<CategoryRule> {
    DEFAULT_CATEGORY_RULES
        .iter()
        .flat_map(|(category, keywords)| {
            keywords
                .iter()
                .map(move |keyword| CategoryRule::new(keyword, category))
        })
        .collect()
}

/// Distinct categories of `rules` in first-seen order, then [`UNCATEGORIZED`].
pub fn category_names(rules: &[CategoryRule]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for rule in rules {
        if rule.category != UNCATEGORIZED && !names.iter().any(|n| n == &rule.category) {
            names.push(rule.category.clone());
        }
    }
    names.push(UNCATEGORIZED.to_string());
    names
}
