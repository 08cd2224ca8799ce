pub mod pdftotext;
pub mod table;

use crate::error::QuoteError;

/// A table as extracted from a page: rows of optional text cells.
/// The first row is the header row.
pub type TableGrid = Vec<Vec<Option<String>>>;

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    /// Ordered text lines with position-preserving whitespace.
    pub lines: Vec<String>,
    pub tables: Vec<TableGrid>,
}

/// Trait for PDF extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text lines and tables from PDF bytes, one PageContent per page.
    ///
    /// An error here means the document itself could not be opened.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, QuoteError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
