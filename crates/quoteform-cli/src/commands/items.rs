use quoteform_core::error::QuoteError;
use std::path::PathBuf;

use crate::output;
use crate::ExtractArgs;

pub fn run(args: &ExtractArgs, output_format: &str, output_file: Option<PathBuf>) -> Result<(), QuoteError> {
    let (extraction, _) = super::extract(args)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&extraction.items)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} item(s) from {} page(s), written to {}",
                extraction.items.len(),
                extraction.page_count,
                path.display()
            );
            for w in &extraction.warnings {
                eprintln!("  warning: {w}");
            }
        }
        None => match output_format {
            "json" => output::json::print(&extraction.items)?,
            _ => output::table::print_items(&extraction.items, &extraction.warnings),
        },
    }

    Ok(())
}
