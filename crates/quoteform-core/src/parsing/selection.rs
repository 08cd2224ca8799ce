use super::header::TableHeaderMap;
use super::values::{clean_cell, contains_digit, is_inclusion};
use super::MergedRow;
use crate::config::SelectionPolicy;

/// Selection-cell texts that are a repeated header, not data.
pub const HEADER_ECHO_TEXTS: &[&str] = &[
    "selected item",
    "price",
    "cost",
    "qty",
    "quantity",
    "montant",
    "prix",
    "total",
];

/// Exact texts that affirm a selection.
pub const AFFIRMATIVE_MARKERS: &[&str] = &["included", "standard", "yes"];

/// Exact texts that deny a selection.
pub const NEGATIVE_MARKERS: &[&str] = &["no", "none", "-", "0"];

/// Why a selection cell was or was not read as a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionVerdict {
    HeaderEcho,
    Empty,
    Numeric,
    Affirmative,
    Negative,
    /// Any other non-blank text; treated as selected.
    Freeform,
}

impl SelectionVerdict {
    pub fn is_selected(self) -> bool {
        matches!(
            self,
            SelectionVerdict::Numeric | SelectionVerdict::Affirmative | SelectionVerdict::Freeform
        )
    }
}

/// Classify the text of a selection cell. First matching rule wins.
pub fn classify_selection_text(text: &str) -> SelectionVerdict {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    if HEADER_ECHO_TEXTS.contains(&lower.as_str()) {
        return SelectionVerdict::HeaderEcho;
    }
    if trimmed.is_empty() {
        return SelectionVerdict::Empty;
    }
    if contains_digit(trimmed) {
        return SelectionVerdict::Numeric;
    }
    if AFFIRMATIVE_MARKERS.contains(&lower.as_str()) {
        return SelectionVerdict::Affirmative;
    }
    if NEGATIVE_MARKERS.contains(&lower.as_str()) {
        return SelectionVerdict::Negative;
    }
    SelectionVerdict::Freeform
}

/// Text deciding selection for a raw table row: the selection cell, or the
/// quantity cell when the selection cell is blank.
pub fn selection_cell_text(row: &[Option<String>], headers: &TableHeaderMap) -> Option<String> {
    clean_cell(row.get(headers.selection_text_source).and_then(Option::as_ref)).or_else(|| {
        headers
            .quantity
            .filter(|&q| q != headers.selection_text_source)
            .and_then(|q| clean_cell(row.get(q).and_then(Option::as_ref)))
    })
}

pub fn classify_row(row: &[Option<String>], headers: &TableHeaderMap) -> SelectionVerdict {
    classify_selection_text(selection_cell_text(row, headers).as_deref().unwrap_or(""))
}

/// Whether a raw table row represents a selected line item.
pub fn is_row_selected(row: &[Option<String>], headers: &TableHeaderMap) -> bool {
    classify_row(row, headers).is_selected()
}

/// Selection decision for a row after continuation lines were merged in.
pub fn is_merged_row_selected(row: &MergedRow, policy: SelectionPolicy) -> bool {
    match policy {
        SelectionPolicy::Strict => is_selected_strict(row),
        SelectionPolicy::Lenient => {
            let text = row.selection.as_deref().or(row.quantity.as_deref());
            classify_selection_text(text.unwrap_or("")).is_selected()
        }
    }
}

/// A row needs a usable quantity (a digit or an inclusion keyword), and then
/// a price, a unit cost, or an inclusion keyword somewhere.
fn is_selected_strict(row: &MergedRow) -> bool {
    let quantity = row.quantity.as_deref();
    let qty_inclusion = is_inclusion(quantity);
    let has_valid_qty = quantity.is_some_and(contains_digit) || qty_inclusion;
    if !has_valid_qty {
        return false;
    }

    row.selection.as_deref().is_some_and(contains_digit)
        || row.unit_cost.as_deref().is_some_and(contains_digit)
        || is_inclusion(row.selection.as_deref())
        || qty_inclusion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::header::resolve_headers;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    None
                } else {
                    Some(c.to_string())
                }
            })
            .collect()
    }

    fn standard_headers() -> TableHeaderMap {
        resolve_headers(&row(&["Description", "Qty", "Selected Item"])).unwrap()
    }

    fn merged(qty: Option<&str>, selection: Option<&str>, unit_cost: Option<&str>) -> MergedRow {
        MergedRow {
            description: Some("Item".into()),
            quantity: qty.map(String::from),
            selection: selection.map(String::from),
            unit_cost: unit_cost.map(String::from),
        }
    }

    #[test]
    fn test_quantity_digit_selects_when_price_blank() {
        let headers = standard_headers();
        assert!(is_row_selected(
            &row(&["FAT / SAT Protocol Package", "1", ""]),
            &headers
        ));
    }

    #[test]
    fn test_blank_row_not_selected() {
        let headers = standard_headers();
        assert!(!is_row_selected(&row(&["Unselected Item", "", ""]), &headers));
        assert_eq!(
            classify_row(&row(&["Unselected Item", "", ""]), &headers),
            SelectionVerdict::Empty
        );
    }

    #[test]
    fn test_header_echo_rejected() {
        let headers = standard_headers();
        let repeated = row(&["Description", "Qty", "Selected Item"]);
        assert_eq!(classify_row(&repeated, &headers), SelectionVerdict::HeaderEcho);
        assert!(!is_row_selected(&repeated, &headers));
    }

    #[test]
    fn test_classify_selection_text_rules() {
        assert_eq!(classify_selection_text("  "), SelectionVerdict::Empty);
        assert_eq!(classify_selection_text("PRIX"), SelectionVerdict::HeaderEcho);
        assert_eq!(classify_selection_text("$1,200"), SelectionVerdict::Numeric);
        assert_eq!(classify_selection_text("Included"), SelectionVerdict::Affirmative);
        assert_eq!(classify_selection_text("None"), SelectionVerdict::Negative);
        assert_eq!(classify_selection_text("-"), SelectionVerdict::Negative);
        assert_eq!(classify_selection_text("see page 4x"), SelectionVerdict::Numeric);
        assert_eq!(classify_selection_text("on request"), SelectionVerdict::Freeform);
        assert!(classify_selection_text("on request").is_selected());
    }

    #[test]
    fn test_classifier_is_order_independent() {
        let headers = standard_headers();
        let rows = [
            row(&["A", "1", ""]),
            row(&["B", "", "No"]),
            row(&["C", "", "Included"]),
        ];
        let forward: Vec<bool> = rows.iter().map(|r| is_row_selected(r, &headers)).collect();
        let backward: Vec<bool> = rows
            .iter()
            .rev()
            .map(|r| is_row_selected(r, &headers))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![true, false, true]);
    }

    #[test]
    fn test_strict_requires_valid_quantity() {
        assert!(!is_merged_row_selected(
            &merged(None, Some("1,000"), None),
            SelectionPolicy::Strict
        ));
        assert!(!is_merged_row_selected(
            &merged(Some("ea"), Some("1,000"), None),
            SelectionPolicy::Strict
        ));
    }

    #[test]
    fn test_strict_price_or_unit_cost_or_inclusion() {
        assert!(is_merged_row_selected(
            &merged(Some("1"), Some("1,000"), None),
            SelectionPolicy::Strict
        ));
        assert!(is_merged_row_selected(
            &merged(Some("1"), None, Some("250.00")),
            SelectionPolicy::Strict
        ));
        assert!(is_merged_row_selected(
            &merged(Some("1"), Some("Included"), None),
            SelectionPolicy::Strict
        ));
        assert!(is_merged_row_selected(
            &merged(Some("Incl."), None, None),
            SelectionPolicy::Strict
        ));
        assert!(!is_merged_row_selected(
            &merged(Some("1"), None, None),
            SelectionPolicy::Strict
        ));
    }

    #[test]
    fn test_lenient_policy_uses_cell_classifier() {
        assert!(is_merged_row_selected(
            &merged(Some("1"), None, None),
            SelectionPolicy::Lenient
        ));
        assert!(!is_merged_row_selected(
            &merged(None, Some("No"), None),
            SelectionPolicy::Lenient
        ));
    }
}
