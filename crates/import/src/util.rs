use chrono::{Datelike, NaiveDate};
use cleanfi_core::Money;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Levenshtein edit distance using the two-row O(min(m,n)) space algorithm.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a = s1.as_bytes();
    let b = s2.as_bytes();
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// 1.0 for identical strings, falling towards 0.0 with each edit.
pub fn similarity(s1: &str, s2: &str) -> f32 {
    let max_len = s1.len().max(s2.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein_distance(s1, s2) as f32 / max_len as f32)
}

/// Lowercase, drop punctuation, collapse whitespace: `"STARBUCKS #123"` → `"starbucks 123"`.
pub fn normalize_text(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase words of a column header; punctuation separates words.
pub fn header_words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True if `needle` appears as a contiguous run of whole words in `haystack`.
pub fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// Parses a statement amount.
///
/// Accepts currency symbols, comma thousands separators, quotes, accounting
/// parentheses, leading or trailing signs, and a leading or trailing word such
/// as `USD` or `CR` (ignored). Anything else is rejected.
pub fn parse_amount(raw: &str) -> Option<Money> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ',') && !c.is_whitespace())
        .collect();

    let mut s = cleaned
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let mut negative = false;

    // Wrappers can nest in either order: `-$50`, `$-50`, `($50)`, `$(50)`, `50.00-`.
    for _ in 0..2 {
        if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
            negative = true;
            s = inner;
        }
        if let Some(rest) = s.strip_suffix('-') {
            negative = true;
            s = rest;
        } else if let Some(rest) = s.strip_suffix('+') {
            s = rest;
        }
        if let Some(rest) = s.strip_prefix('-') {
            negative = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest;
        }
        s = s
            .trim_start_matches(CURRENCY_SYMBOLS)
            .trim_end_matches(CURRENCY_SYMBOLS);
    }

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value = Decimal::from_str(s).ok()?;
    Some(Money::new(if negative { -value } else { value }))
}

/// Month-first formats are tried before day-first ones.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = parse_date_only(s) {
        return Some(date);
    }
    // Timestamps: keep the part before the time.
    s.split(['T', ' '])
        .next()
        .filter(|head| head.len() < s.len())
        .and_then(parse_date_only)
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            // `%Y` happily reads "24" as the year 24.
            .filter(|d| d.year() >= 1000)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── levenshtein ───────────────────────────────────────────────────────────

    #[test]
    fn identical_strings_are_zero() {
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("", ""), 0);
    }

    #[test]
    fn empty_string_is_length_of_other() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
    }

    #[test]
    fn single_edits() {
        assert_eq!(levenshtein_distance("cat", "bat"), 1);
        assert_eq!(levenshtein_distance("amount", "ammount"), 1);
        assert_eq!(levenshtein_distance("abcd", "abc"), 1);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("amount", "amount"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert!(similarity("ammount", "amount") > 0.8);
        assert!(similarity("date", "data") < 0.8);
    }

    // ── text ──────────────────────────────────────────────────────────────────

    #[test]
    fn normalize_text_strips_punctuation() {
        assert_eq!(normalize_text("STARBUCKS #123"), "starbucks 123");
        assert_eq!(normalize_text("  AT&T   Bill-Pay "), "att billpay");
        assert_eq!(normalize_text("Chili's"), "chilis");
        assert_eq!(normalize_text("###"), "");
    }

    #[test]
    fn header_words_split_on_punctuation() {
        assert_eq!(header_words("Txn_Date"), vec!["txn", "date"]);
        assert_eq!(header_words("Running Bal."), vec!["running", "bal"]);
        assert_eq!(header_words("Debit/Credit"), vec!["debit", "credit"]);
    }

    #[test]
    fn contains_words_needs_whole_words() {
        let hay = header_words("Txn Date");
        assert!(contains_words(&hay, &header_words("date")));
        assert!(!contains_words(&header_words("Update"), &header_words("date")));
        assert!(!contains_words(&hay, &[]));
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45"), Some(money("123.45")));
        assert_eq!(parse_amount("-4.50"), Some(money("-4.50")));
        assert_eq!(parse_amount("  100 "), Some(money("100")));
        assert_eq!(parse_amount("+7"), Some(money("7")));
    }

    #[test]
    fn parse_amount_currency_and_thousands() {
        assert_eq!(parse_amount("$1,234.56"), Some(money("1234.56")));
        assert_eq!(parse_amount("-$50.00"), Some(money("-50")));
        assert_eq!(parse_amount("$-50.00"), Some(money("-50")));
        assert_eq!(parse_amount("€9.99"), Some(money("9.99")));
        assert_eq!(parse_amount("\"2,000.00\""), Some(money("2000")));
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("(12.00)"), Some(money("-12.00")));
        assert_eq!(parse_amount("($1,234.56)"), Some(money("-1234.56")));
        assert_eq!(parse_amount("$(75.25)"), Some(money("-75.25")));
    }

    #[test]
    fn parse_amount_trailing_sign_and_indicator() {
        assert_eq!(parse_amount("12.00-"), Some(money("-12")));
        assert_eq!(parse_amount("12.00+"), Some(money("12")));
        assert_eq!(parse_amount("45.10 CR"), Some(money("45.10")));
        assert_eq!(parse_amount("USD 3.00"), Some(money("3")));
    }

    #[test]
    fn parse_amount_invalid() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("12 apples 3"), None);
        assert_eq!(parse_amount("1e5"), None);
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn parse_date_iso_and_us() {
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("1/5/2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn parse_date_day_first_fallback() {
        assert_eq!(parse_date("13/01/2025"), Some(date(2025, 1, 13)));
        assert_eq!(parse_date("31.12.2024"), Some(date(2024, 12, 31)));
    }

    #[test]
    fn parse_date_two_digit_year() {
        assert_eq!(parse_date("1/5/24"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn parse_date_month_names() {
        assert_eq!(parse_date("05 Jan 2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("Jan 5, 2024"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("January 5, 2024"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn parse_date_with_time() {
        assert_eq!(parse_date("2024-01-05 10:30:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30:00Z"), Some(date(2024, 1, 5)));
    }

    #[test]
    fn parse_date_invalid() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("02/30/2025"), None);
        assert_eq!(parse_date("13/13/2025"), None);
    }
}
