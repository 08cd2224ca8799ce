use regex::Regex;
use std::sync::LazyLock;

/// Description prefixes that never name a main machine.
pub const NON_MACHINE_PREFIXES: &[&str] = &["each", "option", "accessory", "optional"];

/// Patterns (matched against the lowercased description) naming a main machine.
pub const MAIN_MACHINE_PATTERNS: &[&str] = &[
    r"model.*[0-9]{2,}",
    r"\bmonoblock\b",
    r"\bunscrambler\b",
    r"\bfiller\b",
    r"\bcapper\b",
    r"\blabeler\b",
    r"\bcartoner\b",
    r"\bcase\s*packer\b",
];

/// Patterns (matched against the lowercased description) naming items shared by all machines.
pub const COMMON_ITEM_PATTERNS: &[&str] = &[
    r"warranty",
    r"installation",
    r"documentation",
    r"training",
    r"spare\s*parts\s*kit",
    r"service",
    r"maintenance",
    r"validation",
    r"shipping",
    r"delivery",
];

static MAIN_MACHINE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(MAIN_MACHINE_PATTERNS));

static COMMON_ITEM_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(COMMON_ITEM_PATTERNS));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in keyword pattern is valid"))
        .collect()
}

pub fn has_non_machine_prefix(description: &str) -> bool {
    let lower = description.to_lowercase();
    NON_MACHINE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

pub fn matches_machine_keyword(description: &str) -> bool {
    let lower = description.to_lowercase();
    MAIN_MACHINE_REGEXES.iter().any(|re| re.is_match(&lower))
}

pub fn matches_common_keyword(description: &str) -> bool {
    let lower = description.to_lowercase();
    COMMON_ITEM_REGEXES.iter().any(|re| re.is_match(&lower))
}
