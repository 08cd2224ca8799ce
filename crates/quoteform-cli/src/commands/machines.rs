use quoteform_core::error::QuoteError;

use crate::output;
use crate::ExtractArgs;

pub fn run(args: &ExtractArgs, output_format: &str) -> Result<(), QuoteError> {
    let (extraction, config) = super::extract(args)?;

    match output_format {
        "json" => output::json::print(&extraction.grouping)?,
        _ => output::table::print_machines(&extraction.grouping, config.price_threshold),
    }

    Ok(())
}
