pub mod context;
pub mod diff;
pub mod items;
pub mod layout;
pub mod machines;

use quoteform_core::config::{load_config, validate_config, ExtractionConfig};
use quoteform_core::error::QuoteError;
use quoteform_core::extraction::pdftotext::PdftotextExtractor;
use quoteform_core::model::FieldRecord;
use quoteform_core::QuoteExtraction;
use std::path::Path;
use tracing::debug;

use crate::ExtractArgs;

/// Config file (or defaults) with the command-line threshold applied.
pub fn extraction_config(args: &ExtractArgs) -> Result<ExtractionConfig, QuoteError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExtractionConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.price_threshold = threshold;
        validate_config(&config)?;
    }
    Ok(config)
}

pub fn extract(args: &ExtractArgs) -> Result<(QuoteExtraction, ExtractionConfig), QuoteError> {
    let config = extraction_config(args)?;
    if !PdftotextExtractor::is_available() {
        return Err(QuoteError::PdftotextNotFound);
    }
    let pdf_bytes = std::fs::read(&args.pdf_file)
        .map_err(|e| QuoteError::SourceUnavailable(format!("{}: {e}", args.pdf_file.display())))?;
    debug!(path = %args.pdf_file.display(), bytes = pdf_bytes.len(), "read quote");
    let extraction = quoteform_core::extract_quote(&pdf_bytes, &PdftotextExtractor::new(), &config)?;
    Ok((extraction, config))
}

pub fn read_record(path: &Path) -> Result<FieldRecord, QuoteError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
