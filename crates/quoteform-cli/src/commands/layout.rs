use quoteform_core::error::QuoteError;
use quoteform_core::hierarchy::{FieldHierarchyResolver, LayoutMode};
use quoteform_core::sources::{cached_field_order, load_html_layout};
use std::path::Path;

use crate::output;

pub fn run(order: &Path, html: Option<&Path>, record: &Path, output_format: &str) -> Result<(), QuoteError> {
    let mapping = cached_field_order(order)?;
    let html_layout = html.map(load_html_layout).transpose()?;
    let record = super::read_record(record)?;

    let resolver = FieldHierarchyResolver::new(&mapping, html_layout.as_ref());
    let layout = resolver.layout(&record, LayoutMode::CurrentForm);

    match output_format {
        "json" => output::json::print(&layout)?,
        _ => output::table::print_layout(&layout),
    }
    Ok(())
}

pub fn catalogue(order: &Path, record: &Path, output_format: &str) -> Result<(), QuoteError> {
    let mapping = cached_field_order(order)?;
    let record = super::read_record(record)?;

    let resolver = FieldHierarchyResolver::new(&mapping, None);
    let catalogue = resolver.catalogue(&record);

    match output_format {
        "json" => output::json::print(&catalogue)?,
        _ => {
            if catalogue.field_count() == 0 {
                println!("All fields of the field order are present.");
            } else {
                output::table::print_layout(&catalogue);
            }
        }
    }
    Ok(())
}
