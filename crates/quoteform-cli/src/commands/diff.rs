use chrono::Utc;
use quoteform_core::error::QuoteError;
use quoteform_core::reconcile::{build_modifications, diff_records, InMemoryModificationStore, ModificationSink};
use std::path::Path;

use crate::output;

pub fn run(
    original: &Path,
    edited: &Path,
    template_id: Option<i64>,
    reason: &str,
    author: &str,
    output_format: &str,
) -> Result<(), QuoteError> {
    let original = super::read_record(original)?;
    let edited = super::read_record(edited)?;
    let changes = diff_records(&original, &edited);

    let Some(template_id) = template_id else {
        match output_format {
            "json" => output::json::print(&changes)?,
            _ => output::table::print_changes(&changes),
        }
        return Ok(());
    };

    let mut store = InMemoryModificationStore::new();
    store.upsert_all(build_modifications(template_id, &changes, reason, author, Utc::now()))?;
    let rows: Vec<_> = store.for_template(template_id).collect();

    match output_format {
        "json" => output::json::print(&rows)?,
        _ => output::table::print_changes(&changes),
    }
    Ok(())
}
