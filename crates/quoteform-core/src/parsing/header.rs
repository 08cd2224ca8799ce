/// Header synonyms marking the description column.
pub const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "item",
    "option",
    "feature",
    "article",
    "désignation",
];

/// Header synonyms marking the quantity column.
pub const QUANTITY_HEADERS: &[&str] = &["qty", "quantity", "qté", "quant"];

/// Header synonyms marking the final price / selection column.
pub const PRICE_HEADERS: &[&str] = &[
    "selected item",
    "total",
    "amount",
    "price",
    "prix",
    "montant",
];

/// Header synonyms marking a per-unit cost column (secondary selection signal).
pub const UNIT_COST_HEADERS: &[&str] = &["unit cost", "unit price"];

/// Column roles resolved from a table's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeaderMap {
    pub description: usize,
    /// Column whose text decides selection: the price column, or the
    /// quantity column when the table has no price column.
    pub selection_text_source: usize,
    pub quantity: Option<usize>,
    pub unit_cost: Option<usize>,
}

/// Resolve the description, quantity and price/selection columns of a table.
///
/// Returns None when the table has no description column, or has neither a
/// price nor a quantity column. Leftmost match wins for each vocabulary.
pub fn resolve_headers(header_row: &[Option<String>]) -> Option<TableHeaderMap> {
    let description = find_column(header_row, DESCRIPTION_HEADERS)?;
    let quantity = find_column(header_row, QUANTITY_HEADERS);
    let price = find_column(header_row, PRICE_HEADERS);

    let selection_text_source = price.or(quantity)?;

    Some(TableHeaderMap {
        description,
        selection_text_source,
        quantity,
        unit_cost: find_column(header_row, UNIT_COST_HEADERS),
    })
}

/// Index of the first header cell containing any of `keys` (case-insensitive).
pub fn find_column(header_row: &[Option<String>], keys: &[&str]) -> Option<usize> {
    header_row.iter().position(|cell| match cell {
        Some(text) => {
            let lower = text.to_lowercase();
            keys.iter().any(|k| lower.contains(k))
        }
        None => false,
    })
}
