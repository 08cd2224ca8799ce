use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label given to selected rows whose description cell is empty.
pub const NO_DESCRIPTION: &str = "(No Description Found)";

/// One selected row of a quote table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity_text: Option<String>,
    pub selection_text: Option<String>,
    /// Numeric price, when known. The grouper fills this in for every item it sees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_numeric: Option<Decimal>,
}

impl LineItem {
    pub fn new(description: impl Into<String>) -> Self {
        LineItem {
            description: description.into(),
            quantity_text: None,
            selection_text: None,
            price_numeric: None,
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity_text = Some(quantity.into());
        self
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection_text = Some(selection.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price_numeric = Some(price);
        self
    }

    /// First line of the description, used as a display name.
    pub fn headline(&self) -> &str {
        self.description.lines().next().unwrap_or("").trim()
    }

    /// Identity used for de-duplication across a document.
    pub fn dedup_key(&self) -> (&str, Option<&str>, Option<&str>) {
        (
            self.description.as_str(),
            self.quantity_text.as_deref(),
            self.selection_text.as_deref(),
        )
    }
}

/// Flat field-key -> value record edited by users.
///
/// Boolean fields hold the literal strings "YES"/"NO"; absent values are
/// empty strings when handed to persistence or rendering.
pub type FieldRecord = BTreeMap<String, String>;
