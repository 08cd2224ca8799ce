use quoteform_core::error::QuoteError;

use crate::ExtractArgs;

pub fn run(args: &ExtractArgs, trigger: &str) -> Result<(), QuoteError> {
    let config = super::extraction_config(args)?;
    let pdf_bytes = std::fs::read(&args.pdf_file)
        .map_err(|e| QuoteError::SourceUnavailable(format!("{}: {e}", args.pdf_file.display())))?;
    let extractor = quoteform_core::extraction::pdftotext::PdftotextExtractor::new();

    let text = quoteform_core::collect_item_context(&pdf_bytes, &extractor, trigger, &config)?;
    if text.is_empty() {
        eprintln!("No text found after '{trigger}'");
    } else {
        println!("{text}");
    }
    Ok(())
}
