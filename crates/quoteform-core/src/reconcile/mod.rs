pub mod store;

pub use store::{build_modifications, InMemoryModificationStore, Modification, ModificationSink};

use crate::model::FieldRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Key suffix marking checkbox fields.
pub const BOOLEAN_SUFFIX: &str = "_check";

pub const YES: &str = "YES";
pub const NO: &str = "NO";

/// Values (compared case-insensitively) that make a field boolean.
pub const BOOLEAN_LITERALS: &[&str] = &["YES", "NO", "TRUE", "FALSE"];

/// Values that look like an extraction placeholder rather than real data.
pub const PLACEHOLDER_PHRASES: &[&str] = &[
    "n/a",
    "not applicable",
    "not specified",
    "not selected",
    "none selected",
    "to be determined",
    "tbd",
    "pending",
    "not available",
    "unknown",
    "not provided",
    "see quote",
    "refer to quote",
    "as per quote",
    "not mentioned",
];

pub fn is_boolean_literal(value: &str) -> bool {
    let upper = value.trim().to_uppercase();
    BOOLEAN_LITERALS.contains(&upper.as_str())
}

/// A field is boolean when its key carries the checkbox suffix or its value
/// is one of the boolean literals.
pub fn is_boolean_field(key: &str, value: Option<&str>) -> bool {
    key.ends_with(BOOLEAN_SUFFIX) || value.is_some_and(is_boolean_literal)
}

/// "YES" for yes/true in any case, "NO" for everything else including absence.
pub fn canonical_boolean(value: Option<&str>) -> &'static str {
    match value.map(|v| v.trim().to_uppercase()) {
        Some(v) if v == "YES" || v == "TRUE" => YES,
        _ => NO,
    }
}

/// Placeholder text, or a bare yes/no in a field that is not a checkbox.
pub fn is_suspicious_value(key: &str, value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if PLACEHOLDER_PHRASES.contains(&lower.as_str()) {
        return true;
    }
    !key.ends_with(BOOLEAN_SUFFIX) && matches!(lower.as_str(), "yes" | "no" | "true" | "false")
}

/// One field whose normalized value changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub original_value: String,
    pub new_value: String,
}

/// Changed fields by key. Empty when nothing differs.
pub type ChangeSet = BTreeMap<String, FieldChange>;

/// Compare one field after normalization; `None` when the values agree.
///
/// The boolean decision looks at the key, then the original value, and only
/// falls back to the new value when the original is absent or blank.
pub fn compare_field(key: &str, original: Option<&str>, new: Option<&str>) -> Option<FieldChange> {
    let boolean = match original.filter(|o| !o.trim().is_empty()) {
        Some(o) => is_boolean_field(key, Some(o)),
        None => is_boolean_field(key, new),
    };

    let (original_value, new_value) = if boolean {
        (canonical_boolean(original).to_string(), canonical_boolean(new).to_string())
    } else {
        (
            original.unwrap_or_default().to_string(),
            new.unwrap_or_default().to_string(),
        )
    };

    (original_value != new_value).then_some(FieldChange {
        original_value,
        new_value,
    })
}

/// Diff two full records over the union of their keys.
pub fn diff_records(original: &FieldRecord, edited: &FieldRecord) -> ChangeSet {
    let keys: BTreeSet<&String> = original.keys().chain(edited.keys()).collect();
    let changes: ChangeSet = keys
        .into_iter()
        .filter_map(|key| {
            compare_field(
                key,
                original.get(key).map(String::as_str),
                edited.get(key).map(String::as_str),
            )
            .map(|change| (key.clone(), change))
        })
        .collect();

    debug!(changed = changes.len(), "diffed field records");
    changes
}

/// Diff only the fields named in `edits`.
pub fn diff_sparse(original: &FieldRecord, edits: &BTreeMap<String, String>) -> ChangeSet {
    edits
        .iter()
        .filter_map(|(key, new)| {
            compare_field(key, original.get(key).map(String::as_str), Some(new.as_str()))
                .map(|change| (key.clone(), change))
        })
        .collect()
}

/// Record with every change applied, as handed to a template renderer.
pub fn apply_changes(record: &FieldRecord, changes: &ChangeSet) -> FieldRecord {
    let mut updated = record.clone();
    for (key, change) in changes {
        updated.insert(key.clone(), change.new_value.clone());
    }
    updated
}
