use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use calamine::{Data, Reader, Xlsx};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::QuoteError;
use crate::hierarchy::{FieldPathEntry, FieldPathMapping, PathDelimiter, OPTIONS_SECTION, OPTIONS_SUMMARY_KEY};

/// Worksheet holding the form definition.
pub const FORM_SHEET: &str = "Form";

/// Field name of the row added when a workbook has no options summary.
pub const AUTO_OPTIONS_FIELD: &str = "Options Listing (auto-generated)";

static EXAMPLE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-\s*example:.*").expect("invalid example hint pattern"));
static TYPE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((text|checkbox|qty|text heading|heading)[^)]*\)").expect("invalid type hint pattern")
});
static SECTION_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(section\)").expect("invalid section hint pattern"));

/// One row of the "Form" sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub section: String,
    pub subsection: String,
    pub subsub: String,
    pub field: String,
    /// Lowercased input type: "text", "checkbox", "qty", "textarea".
    pub kind: String,
    /// Field key.
    pub placeholder: String,
}

impl FormRow {
    /// Path in " - " notation: section, group title, label.
    /// The group title joins subsection and sub-subsection with " / ",
    /// matching the group titles of the generated form.
    pub fn path(&self) -> String {
        let group: Vec<&str> = [self.subsection.as_str(), self.subsub.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        let group = group.join(" / ");
        let section = clean_section_name(&self.section);
        let label = display_label(&self.field);

        [section.as_str(), group.as_str(), label.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(PathDelimiter::Dash.as_str())
    }
}

/// Field name without input-type hints and example text.
pub fn display_label(raw: &str) -> String {
    let label = EXAMPLE_HINT.replace_all(raw, "");
    let label = TYPE_HINT.replace_all(&label, "");
    label.trim_matches(|c: char| c == ' ' || c == '-' || c == ':').to_string()
}

pub fn clean_section_name(raw: &str) -> String {
    SECTION_HINT.replace_all(raw, "").trim().to_string()
}

/// Read the form rows of an xlsx workbook. The header row is skipped, as are
/// rows without a field name or key.
pub fn read_form_rows(bytes: &[u8]) -> Result<Vec<FormRow>, QuoteError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| QuoteError::OrderSourceParse(format!("failed to open xlsx: {e}")))?;

    let sheet = workbook
        .worksheet_range(FORM_SHEET)
        .map_err(|e| QuoteError::OrderSourceParse(format!("sheet '{FORM_SHEET}' not found: {e}")))?;

    let mut rows = Vec::new();
    for raw in sheet.rows().skip(1) {
        if raw.len() < 6 {
            continue;
        }
        let text = |i: usize| cell_as_string(&raw[i]).unwrap_or_default();
        let (field, placeholder) = (text(3), text(5));
        if field.is_empty() || placeholder.is_empty() {
            continue;
        }
        rows.push(FormRow {
            section: text(0),
            subsection: text(1),
            subsub: text(2),
            field,
            kind: text(4).to_lowercase(),
            placeholder,
        });
    }

    debug!(rows = rows.len(), "read form sheet");
    Ok(rows)
}

/// Make sure the options summary has a row: reuse the first "Option Listing"
/// row, or append one.
pub fn ensure_options_listing(rows: &mut Vec<FormRow>) {
    if rows.iter().any(|r| r.placeholder == OPTIONS_SUMMARY_KEY) {
        return;
    }

    let target = OPTIONS_SECTION.to_lowercase();
    let existing = rows.iter_mut().find(|r| {
        r.section.trim().to_lowercase() == target || r.field.trim().to_lowercase().starts_with(&target)
    });

    match existing {
        Some(row) => {
            row.placeholder = OPTIONS_SUMMARY_KEY.to_string();
            row.kind = "textarea".to_string();
        }
        None => rows.push(FormRow {
            section: OPTIONS_SECTION.to_string(),
            subsection: String::new(),
            subsub: String::new(),
            field: AUTO_OPTIONS_FIELD.to_string(),
            kind: "textarea".to_string(),
            placeholder: OPTIONS_SUMMARY_KEY.to_string(),
        }),
    }
}

pub fn rows_to_mapping(rows: &[FormRow]) -> FieldPathMapping {
    FieldPathMapping::new(
        PathDelimiter::Dash,
        rows.iter().map(|r| FieldPathEntry {
            key: r.placeholder.clone(),
            path: r.path(),
        }),
    )
}

pub fn parse_field_order_xlsx(bytes: &[u8]) -> Result<FieldPathMapping, QuoteError> {
    let mut rows = read_form_rows(bytes)?;
    ensure_options_listing(&mut rows);
    Ok(rows_to_mapping(&rows))
}

/// JSON field order: either a bare list of `{"key", "path"}` objects
/// (" - " paths) or an object naming the delimiter.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldOrderDocument {
    List(Vec<FieldPathEntry>),
    Document {
        #[serde(default)]
        delimiter: PathDelimiter,
        fields: Vec<FieldPathEntry>,
    },
}

pub fn parse_field_order_json(json: &str) -> Result<FieldPathMapping, QuoteError> {
    let doc: FieldOrderDocument =
        serde_json::from_str(json).map_err(|e| QuoteError::OrderSourceParse(e.to_string()))?;
    Ok(match doc {
        FieldOrderDocument::List(fields) => FieldPathMapping::new(PathDelimiter::Dash, fields),
        FieldOrderDocument::Document { delimiter, fields } => FieldPathMapping::new(delimiter, fields),
    })
}

/// Load a field order from disk; `.xlsx` files are read as workbooks,
/// anything else as JSON.
pub fn load_field_order(path: &Path) -> Result<FieldPathMapping, QuoteError> {
    let load_err = |reason: String| QuoteError::OrderSourceLoad {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
    let is_xlsx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    let mapping = if is_xlsx {
        parse_field_order_xlsx(&bytes)
    } else {
        let text = String::from_utf8(bytes).map_err(|e| load_err(e.to_string()))?;
        parse_field_order_json(&text)
    }
    .map_err(|e| load_err(e.to_string()))?;

    info!(path = %path.display(), fields = mapping.len(), "loaded field order");
    Ok(mapping)
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(section: &str, subsection: &str, subsub: &str, field: &str, placeholder: &str) -> FormRow {
        FormRow {
            section: section.into(),
            subsection: subsection.into(),
            subsub: subsub.into(),
            field: field.into(),
            kind: "text".into(),
            placeholder: placeholder.into(),
        }
    }

    #[test]
    fn test_display_label_strips_hints() {
        assert_eq!(display_label("Voltage (text)"), "Voltage");
        assert_eq!(display_label("Guard doors (checkbox) - example: yes"), "Guard doors");
        assert_eq!(display_label("Heads (qty):"), "Heads");
    }

    #[test]
    fn test_row_path() {
        assert_eq!(
            row("Controls (section)", "Safety", "", "Emergency Stop (checkbox)", "estop_check").path(),
            "Controls - Safety - Emergency Stop"
        );
        assert_eq!(
            row("Capping", "Chucks", "Torque", "Range", "torque_range").path(),
            "Capping - Chucks / Torque - Range"
        );
        assert_eq!(row("General", "", "", "Customer", "customer").path(), "General - Customer");
    }

    #[test]
    fn test_options_listing_reuses_option_row() {
        let mut rows = vec![
            row("General", "", "", "Customer", "customer"),
            row("Option Listing", "", "", "Options", "f0091"),
        ];
        ensure_options_listing(&mut rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].placeholder, OPTIONS_SUMMARY_KEY);
        assert_eq!(rows[1].kind, "textarea");
    }

    #[test]
    fn test_options_listing_appended_when_missing() {
        let mut rows = vec![row("General", "", "", "Customer", "customer")];
        ensure_options_listing(&mut rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].path(), "Option Listing - Options Listing (auto-generated)");

        let mapping = rows_to_mapping(&rows);
        assert_eq!(mapping.rank(OPTIONS_SUMMARY_KEY), Some(1));
    }

    #[test]
    fn test_options_listing_left_alone_when_present() {
        let mut rows = vec![row("Misc", "", "", "Quoted options", OPTIONS_SUMMARY_KEY)];
        ensure_options_listing(&mut rows);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].section, "Misc");
    }

    #[test]
    fn test_parse_json_list() {
        let json = r#"[
            {"key": "customer", "path": "General - Customer"},
            {"key": "estop_check", "path": "Controls - Safety - Emergency Stop"}
        ]"#;
        let mapping = parse_field_order_json(json).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.delimiter(), PathDelimiter::Dash);
        assert_eq!(mapping.rank("estop_check"), Some(1));
    }

    #[test]
    fn test_parse_json_document_with_delimiter() {
        let json = r#"{"delimiter": "angle", "fields": [{"key": "customer", "path": "GENERAL > Customer"}]}"#;
        let mapping = parse_field_order_json(json).unwrap();
        assert_eq!(mapping.delimiter(), PathDelimiter::Angle);
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(matches!(
            parse_field_order_json("{\"nope\": 1}"),
            Err(QuoteError::OrderSourceParse(_))
        ));
    }

    #[test]
    fn test_xlsx_rejects_non_workbook() {
        assert!(matches!(
            parse_field_order_xlsx(b"not a zip"),
            Err(QuoteError::OrderSourceParse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_field_order(Path::new("/nonexistent/order.json")).unwrap_err();
        assert!(matches!(err, QuoteError::OrderSourceLoad { .. }));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"[{"key": "a", "path": "S - A"}]"#).unwrap();
        let mapping = load_field_order(file.path()).unwrap();
        assert_eq!(mapping.path("a"), Some("S - A"));
    }
}
