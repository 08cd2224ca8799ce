pub mod context;
pub mod header;
pub mod selection;
pub mod values;

use crate::config::SelectionPolicy;
use crate::error::{Warning, WarningKind};
use crate::extraction::{PageContent, TableGrid};
use crate::model::{LineItem, NO_DESCRIPTION};
use header::{resolve_headers, TableHeaderMap};
use selection::is_merged_row_selected;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use values::{clean_cell, contains_digit, parse_price};

/// One logical table row after continuation lines were folded into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRow {
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub selection: Option<String>,
    pub unit_cost: Option<String>,
}

/// Selected line items of a document, plus what was skipped on the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemExtraction {
    pub items: Vec<LineItem>,
    pub warnings: Vec<Warning>,
}

/// Walk every table of every page and collect the unique selected line items.
///
/// Unusable tables are skipped with a warning; they never abort the document.
pub fn extract_line_items(pages: &[PageContent], policy: SelectionPolicy) -> LineItemExtraction {
    let mut extraction = LineItemExtraction::default();
    let mut seen: HashSet<(String, Option<String>, Option<String>)> = HashSet::new();

    for page in pages {
        for (table_idx, table) in page.tables.iter().enumerate() {
            let location = format!("page {}, table {}", page.page_number, table_idx + 1);

            let Some(headers) = table.first().and_then(|h| resolve_headers(h)) else {
                debug!(page = page.page_number, table = table_idx + 1, "skipping table without usable headers");
                extraction.warnings.push(Warning::new(
                    WarningKind::TableUnusable,
                    location,
                    "no description column with a quantity or price column",
                ));
                continue;
            };

            for row in merge_rows(table, &headers) {
                if !is_merged_row_selected(&row, policy) {
                    continue;
                }

                let item = to_line_item(row, &location, &mut extraction.warnings);
                let key = (
                    item.description.clone(),
                    item.quantity_text.clone(),
                    item.selection_text.clone(),
                );
                if seen.insert(key) {
                    extraction.items.push(item);
                }
            }
        }
    }

    info!(
        items = extraction.items.len(),
        warnings = extraction.warnings.len(),
        "line item extraction finished"
    );
    extraction
}

/// Fold continuation rows into the preceding logical row.
///
/// A row opens a new item when its quantity, selection or unit-cost cell has
/// content. Other rows only contribute their description text. Rows before
/// the first item are dropped.
pub fn merge_rows(table: &TableGrid, headers: &TableHeaderMap) -> Vec<MergedRow> {
    let mut merged = Vec::new();
    let mut current: Option<MergedRow> = None;

    for row in table.iter().skip(1) {
        let cell = |idx: Option<usize>| idx.and_then(|i| clean_cell(row.get(i).and_then(Option::as_ref)));

        let quantity = cell(headers.quantity);
        let selection = cell(Some(headers.selection_text_source));
        let unit_cost = cell(headers.unit_cost);
        let has_essential_content = quantity.is_some() || selection.is_some() || unit_cost.is_some();

        let mut description = cell(Some(headers.description));

        if has_essential_content {
            if description.is_none() {
                description = shifted_description(row, headers);
            }
            if let Some(done) = current.take() {
                merged.push(done);
            }
            current = Some(MergedRow {
                description,
                quantity,
                selection,
                unit_cost,
            });
        } else if let (Some(item), Some(extra)) = (current.as_mut(), description) {
            item.description = Some(match item.description.take() {
                Some(existing) => format!("{existing}\n{extra}"),
                None => extra,
            });
        }
    }

    if let Some(done) = current {
        merged.push(done);
    }
    merged
}

/// Longest non-empty cell outside the known columns, for rows whose
/// description drifted into another column. Earliest cell wins ties.
fn shifted_description(row: &[Option<String>], headers: &TableHeaderMap) -> Option<String> {
    let known = [
        Some(headers.description),
        Some(headers.selection_text_source),
        headers.quantity,
        headers.unit_cost,
    ];

    row.iter()
        .enumerate()
        .filter(|(i, _)| !known.contains(&Some(*i)))
        .filter_map(|(_, c)| clean_cell(c.as_ref()))
        .fold(None, |best: Option<String>, candidate| match best {
            Some(b) if b.chars().count() >= candidate.chars().count() => Some(b),
            _ => Some(candidate),
        })
}

fn to_line_item(row: MergedRow, location: &str, warnings: &mut Vec<Warning>) -> LineItem {
    let description = row.description.unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let selection_text = row.selection.or(row.unit_cost);

    let price_numeric = selection_text.as_deref().and_then(parse_price);
    if let Some(text) = selection_text.as_deref() {
        if price_numeric.is_none() && contains_digit(text) {
            warn!(location, text, "could not parse price");
            warnings.push(Warning::new(
                WarningKind::RowUnparseable,
                location,
                format!("price text '{text}' is not a number; treated as 0"),
            ));
        }
    }

    LineItem {
        description,
        quantity_text: row.quantity,
        selection_text,
        price_numeric,
    }
}
