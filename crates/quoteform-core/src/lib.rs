pub mod config;
pub mod error;
pub mod extraction;
pub mod grouping;
pub mod hierarchy;
pub mod model;
pub mod parsing;
pub mod reconcile;
pub mod sources;

use config::ExtractionConfig;
use error::{QuoteError, Warning};
use extraction::{PageContent, PdfExtractor};
use grouping::{group_machines, MachineGrouping};
use model::LineItem;
use parsing::context::collect_context;
use serde::{Deserialize, Serialize};

/// Everything recovered from one quote document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteExtraction {
    pub page_count: usize,
    /// Selected line items in document order.
    pub items: Vec<LineItem>,
    pub grouping: MachineGrouping,
    pub warnings: Vec<Warning>,
}

/// Main API entry point: extract the selected line items of a quote PDF and
/// group them into machines.
///
/// Fails only when the document cannot be opened; unusable tables and
/// unparseable rows are reported as warnings.
pub fn extract_quote(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &ExtractionConfig,
) -> Result<QuoteExtraction, QuoteError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(analyze_pages(&pages, config))
}

/// Same as [`extract_quote`] on pages that were already extracted.
pub fn analyze_pages(pages: &[PageContent], config: &ExtractionConfig) -> QuoteExtraction {
    let extraction = parsing::extract_line_items(pages, config.selection_policy);
    let grouping = group_machines(extraction.items.clone(), config.price_threshold);

    QuoteExtraction {
        page_count: pages.len(),
        items: extraction.items,
        grouping,
        warnings: extraction.warnings,
    }
}

/// Free text following the line that names `trigger`, bounded by the other
/// selected items of the same document.
pub fn collect_item_context(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    trigger: &str,
    config: &ExtractionConfig,
) -> Result<String, QuoteError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    let items = parsing::extract_line_items(&pages, config.selection_policy).items;
    Ok(context_for_items(&pages, trigger, &items, config))
}

pub fn context_for_items(
    pages: &[PageContent],
    trigger: &str,
    items: &[LineItem],
    config: &ExtractionConfig,
) -> String {
    let descriptions: Vec<String> = items.iter().map(|i| i.description.clone()).collect();
    collect_context(pages, trigger, &descriptions, config.context_limits())
}
