use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Substrings marking an item as included without an explicit price.
pub const INCLUSION_KEYWORDS: &[&str] = &["included", "standard", "yes", "incl"];

static PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+|\d+").expect("price token pattern is valid"));

/// Trim a cell, mapping blank cells to None.
pub fn clean_cell(cell: Option<&String>) -> Option<String> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn contains_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// True if the text contains any inclusion keyword (case-insensitive substring).
pub fn is_inclusion(text: Option<&str>) -> bool {
    match text {
        Some(t) => {
            let lower = t.to_lowercase();
            INCLUSION_KEYWORDS.iter().any(|k| lower.contains(k))
        }
        None => false,
    }
}

/// Parse the first numeric token of a price string.
///
/// Handles formats like:
/// - "15,000.00" -> 15000.00
/// - "USD 12500" -> 12500
/// - "Included" -> None
pub fn parse_price(text: &str) -> Option<Decimal> {
    let without_grouping = text.replace(',', "");
    let token = PRICE_TOKEN.find(&without_grouping)?;
    Decimal::from_str(token.as_str()).ok()
}
