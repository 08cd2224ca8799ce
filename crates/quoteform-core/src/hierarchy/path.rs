use serde::{Deserialize, Serialize};

/// Section assigned to fields whose path cannot be read.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Separator between path components; depends on where the mapping came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathDelimiter {
    /// "Section - Subsection - Field" (spreadsheet-derived mappings).
    #[default]
    Dash,
    /// "Section > Subsection > Field".
    Angle,
}

impl PathDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            PathDelimiter::Dash => " - ",
            PathDelimiter::Angle => " > ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    pub section: String,
    pub subsection: Option<String>,
    pub label: String,
}

impl FieldPath {
    /// Placement for a field with no usable path.
    pub fn uncategorized(key: &str) -> Self {
        FieldPath {
            section: UNCATEGORIZED.to_string(),
            subsection: None,
            label: key.to_string(),
        }
    }
}

/// Split a path into section, optional subsection and label.
///
/// Three or more components give section, subsection (the second component)
/// and label (the last). Two give section and label. Fewer return None.
pub fn parse_field_path(path: &str, delimiter: PathDelimiter) -> Option<FieldPath> {
    let parts: Vec<&str> = path
        .split(delimiter.as_str())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] | [_] => None,
        [section, label] => Some(FieldPath {
            section: section.to_string(),
            subsection: None,
            label: label.to_string(),
        }),
        [section, subsection, .., label] => Some(FieldPath {
            section: section.to_string(),
            subsection: Some(subsection.to_string()),
            label: label.to_string(),
        }),
    }
}
