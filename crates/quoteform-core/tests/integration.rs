//! Integration tests for the extraction, grouping, hierarchy and
//! reconciliation pipeline.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, so these tests run without poppler-utils.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use quoteform_core::config::{ExtractionConfig, SelectionPolicy};
use quoteform_core::error::{QuoteError, WarningKind};
use quoteform_core::extraction::pdftotext::split_pages;
use quoteform_core::extraction::{PageContent, PdfExtractor, TableGrid};
use quoteform_core::grouping::{summarize_options, FALLBACK_MACHINE_NAME};
use quoteform_core::hierarchy::{FieldHierarchyResolver, LayoutMode, OPTIONS_SECTION, OPTIONS_SUMMARY_KEY};
use quoteform_core::model::FieldRecord;
use quoteform_core::reconcile::{
    apply_changes, build_modifications, diff_records, InMemoryModificationStore, ModificationSink,
};
use quoteform_core::sources::{parse_field_order_json, parse_html_layout};
use quoteform_core::{collect_item_context, extract_quote};

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, QuoteError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct BrokenExtractor;

impl PdfExtractor for BrokenExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, QuoteError> {
        Err(QuoteError::SourceUnavailable("file is not a PDF".into()))
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

/// Three-page quote as pdftotext -layout prints it.
fn layout_quote() -> MockExtractor {
    let pages = [
        vec![
            "QUOTATION 22-2268",
            "Customer: Acme Beverages",
            "",
            "Description                           Qty        Price",
            "Monoblock Model: Patriot FC 11        1          15,000.00",
            "Filling and capping in one frame",
            "Change parts for 500ml                1          800.00",
            "FAT / SAT Protocol Package            1          Included",
            "Bottle conveyor extension",
            "Warranty extension 12 months          1          1,200.00",
            "",
            "",
            "Prices valid for 60 days",
        ],
        vec![
            "Description                           Qty        Price",
            "Labeler Model LX 40                   1          32,000.00",
            "Extra label magazine                  2          1,500.00",
            "Training (2 days)                     1          2,400.00",
            "Label sample kit                                 N/A",
        ],
        vec![
            "MACHINE DETAILS",
            "Labeler Model LX 40",
            "Technical description of the labeler",
            "  Pressure sensitive labels",
            "  Up to 120 containers per minute",
            "Extra label magazine",
            "  Holds 2 rolls",
            "Terms and Conditions",
            "  Net 30",
        ],
    ];
    let text: String = pages.iter().map(|lines| format!("{}\n\x0c", lines.join("\n"))).collect();
    MockExtractor {
        pages: split_pages(&text),
    }
}

fn table(rows: &[&[&str]]) -> TableGrid {
    rows.iter()
        .map(|r| {
            r.iter()
                .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                .collect()
        })
        .collect()
}

fn table_page(number: usize, tables: Vec<TableGrid>) -> PageContent {
    PageContent {
        page_number: number,
        lines: vec![],
        tables,
    }
}

fn record(pairs: &[(&str, &str)]) -> FieldRecord {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

// ---------------------------------------------------------------------------
// Extraction and grouping
// ---------------------------------------------------------------------------

#[test]
fn layout_quote_items_and_machines() {
    let result = extract_quote(&[], &layout_quote(), &ExtractionConfig::default()).unwrap();

    assert_eq!(result.page_count, 3);
    let headlines: Vec<&str> = result.items.iter().map(|i| i.headline()).collect();
    assert_eq!(
        headlines,
        vec![
            "Monoblock Model: Patriot FC 11",
            "Change parts for 500ml",
            "FAT / SAT Protocol Package",
            "Warranty extension 12 months",
            "Labeler Model LX 40",
            "Extra label magazine",
            "Training (2 days)",
        ]
    );
    assert_eq!(
        result.items[0].description,
        "Monoblock Model: Patriot FC 11\nFilling and capping in one frame"
    );

    let grouping = &result.grouping;
    assert_eq!(grouping.machines.len(), 2);
    assert_eq!(grouping.machines[0].machine_name, "Monoblock Model: Patriot FC 11");
    assert_eq!(grouping.machines[0].main_item.price_numeric, Some(dec!(15000.00)));
    let add_ons: Vec<&str> = grouping.machines[0].add_ons.iter().map(|i| i.headline()).collect();
    assert_eq!(add_ons, vec!["Change parts for 500ml", "FAT / SAT Protocol Package"]);
    assert_eq!(grouping.machines[1].machine_name, "Labeler Model LX 40");

    let common: Vec<&str> = grouping.common_items.iter().map(|i| i.headline()).collect();
    assert_eq!(common, vec!["Warranty extension 12 months", "Training (2 days)"]);
}

#[test]
fn every_item_lands_in_exactly_one_place() {
    let result = extract_quote(&[], &layout_quote(), &ExtractionConfig::default()).unwrap();
    let grouping = &result.grouping;
    assert_eq!(grouping.item_count(), result.items.len());

    let mut placed: Vec<_> = grouping
        .machines
        .iter()
        .flat_map(|m| std::iter::once(&m.main_item).chain(m.add_ons.iter()))
        .chain(grouping.common_items.iter())
        .map(|i| i.description.clone())
        .collect();
    placed.sort();
    let mut extracted: Vec<_> = result.items.iter().map(|i| i.description.clone()).collect();
    extracted.sort();
    assert_eq!(placed, extracted);
}

#[test]
fn extraction_is_idempotent_and_deduplicated() {
    let mut extractor = layout_quote();
    // The same price table repeated on a later page.
    let repeat = extractor.pages[1].clone();
    extractor.pages.push(PageContent {
        page_number: 4,
        ..repeat
    });

    let config = ExtractionConfig::default();
    let first = extract_quote(&[], &extractor, &config).unwrap();
    let second = extract_quote(&[], &extractor, &config).unwrap();
    assert_eq!(first.items, second.items);

    let keys: HashSet<_> = first.items.iter().map(|i| i.dedup_key()).collect();
    assert_eq!(keys.len(), first.items.len());
    assert_eq!(first.items.len(), 7);
}

#[test]
fn options_summary_for_each_machine() {
    let result = extract_quote(&[], &layout_quote(), &ExtractionConfig::default()).unwrap();
    assert_eq!(
        summarize_options(&result.grouping.machines[1]),
        "Selected Options and Specifications:\n- Add-on 1: Extra label magazine"
    );
}

#[test]
fn no_main_machine_falls_back_to_complete_system() {
    let extractor = MockExtractor {
        pages: vec![table_page(
            1,
            vec![table(&[
                &["Item", "Quantity", "Amount"],
                &["Bottle guide rails", "1", "450.00"],
                &["Extended warranty", "1", "900.00"],
                &["Pneumatic kit", "2", "300.00"],
            ])],
        )],
    };
    let result = extract_quote(&[], &extractor, &ExtractionConfig::default()).unwrap();
    let grouping = &result.grouping;
    assert_eq!(grouping.machines.len(), 1);
    assert_eq!(grouping.machines[0].machine_name, FALLBACK_MACHINE_NAME);
    assert_eq!(grouping.machines[0].main_item.description, "Bottle guide rails");
    assert_eq!(grouping.machines[0].add_ons.len(), 2);
    assert!(grouping.common_items.is_empty());
}

#[test]
fn threshold_from_config() {
    let extractor = MockExtractor {
        pages: vec![table_page(
            1,
            vec![table(&[
                &["Description", "Qty", "Price"],
                &["Rinser RX", "1", "12,500.00"],
                &["Conveyor", "1", "4,000.00"],
            ])],
        )],
    };
    let config = ExtractionConfig {
        price_threshold: dec!(20000),
        ..Default::default()
    };
    let result = extract_quote(&[], &extractor, &config).unwrap();
    assert_eq!(result.grouping.machines[0].machine_name, FALLBACK_MACHINE_NAME);

    let result = extract_quote(&[], &extractor, &ExtractionConfig::default()).unwrap();
    assert_eq!(result.grouping.machines[0].machine_name, "Rinser RX");
}

#[test]
fn unusable_tables_are_warnings_not_errors() {
    let extractor = MockExtractor {
        pages: vec![
            table_page(1, vec![table(&[&["Remarks", "Notes"], &["n/a", "n/a"]])]),
            table_page(
                2,
                vec![table(&[
                    &["Description", "Qty", "Selected Item"],
                    &["FAT / SAT Protocol Package", "1", ""],
                    &["Unselected Item", "", ""],
                ])],
            ),
        ],
    };
    let result = extract_quote(&[], &extractor, &ExtractionConfig::default()).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::TableUnusable);
    // Strict rule: quantity alone does not select.
    assert!(result.items.is_empty());

    let lenient = ExtractionConfig {
        selection_policy: SelectionPolicy::Lenient,
        ..Default::default()
    };
    let result = extract_quote(&[], &extractor, &lenient).unwrap();
    let names: Vec<&str> = result.items.iter().map(|i| i.headline()).collect();
    assert_eq!(names, vec!["FAT / SAT Protocol Package"]);
}

#[test]
fn header_words_in_data_rows_keep_the_table_open() {
    let text = [
        "Description                      Qty      Price",
        "Monoblock Model: Patriot FC 11   1     15,000.00",
        "Item 2: Change parts             1     Price incl.",
        "Capper CX                        1      5,000.00",
    ]
    .join("\n");
    let extractor = MockExtractor {
        pages: split_pages(&text),
    };
    let result = extract_quote(&[], &extractor, &ExtractionConfig::default()).unwrap();

    let headlines: Vec<&str> = result.items.iter().map(|i| i.headline()).collect();
    assert_eq!(
        headlines,
        vec!["Monoblock Model: Patriot FC 11", "Item 2: Change parts", "Capper CX"]
    );
}

#[test]
fn unavailable_source_aborts_extraction() {
    let err = extract_quote(b"garbage", &BrokenExtractor, &ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, QuoteError::SourceUnavailable(_)));
}

// ---------------------------------------------------------------------------
// Contextual text
// ---------------------------------------------------------------------------

#[test]
fn context_bounded_by_next_item() {
    let config = ExtractionConfig::default();
    let ctx = collect_item_context(&[], &layout_quote(), "Technical description", &config).unwrap();
    assert_eq!(ctx, "Pressure sensitive labels\nUp to 120 containers per minute");
}

#[test]
fn context_from_table_continuation() {
    let config = ExtractionConfig::default();
    let ctx = collect_item_context(&[], &layout_quote(), "Monoblock Model: Patriot FC 11", &config).unwrap();
    assert_eq!(ctx, "Filling and capping in one frame");
}

#[test]
fn context_of_unknown_trigger_is_empty() {
    let config = ExtractionConfig::default();
    let ctx = collect_item_context(&[], &layout_quote(), "Case packer", &config).unwrap();
    assert!(ctx.is_empty());
}

// ---------------------------------------------------------------------------
// Field hierarchy and reconciliation
// ---------------------------------------------------------------------------

const FIELD_ORDER: &str = r#"[
    {"key": "customer", "path": "General - Customer"},
    {"key": "machine", "path": "General - Machine"},
    {"key": "estop_check", "path": "Controls - Safety - Emergency Stop"},
    {"key": "f0012", "path": "Controls - Safety - Light Curtain"},
    {"key": "voltage", "path": "Utility Specifications - Voltage"},
    {"key": "broken", "path": "NoDelimiterHere"},
    {"key": "options_listing", "path": "Option Listing - Additional Quoted Options"}
]"#;

const FORM_HTML: &str = r#"<html><body>
<section class="section">
  <div class="section-header"><h2>Controls</h2></div>
  <div class="group"><div class="group-title">Safety</div>
    <label class="field checkbox"><input type="checkbox" name="f0012"></label>
    <label class="field checkbox"><input type="checkbox" name="estop_check"></label>
  </div>
</section>
<section class="section">
  <div class="section-header"><h2>General</h2></div>
  <div class="group">
    <label class="field"><input type="text" name="machine"></label>
    <label class="field"><input type="text" name="customer"></label>
  </div>
</section>
</body></html>"#;

#[test]
fn layout_merges_html_and_spreadsheet_order() {
    let mapping = parse_field_order_json(FIELD_ORDER).unwrap();
    let html = parse_html_layout(FORM_HTML).unwrap();
    let resolver = FieldHierarchyResolver::new(&mapping, Some(&html));

    let rec = record(&[
        ("customer", "Acme"),
        ("machine", "Patriot FC 11"),
        ("estop_check", "YES"),
        ("f0012", "NO"),
        ("voltage", "N/A"),
        ("broken", "x"),
        ("options_listing", "Selected Options and Specifications:\n- Add-on 1: Nozzles"),
    ]);
    let layout = resolver.layout(&rec, LayoutMode::CurrentForm);

    let sections: Vec<&str> = layout.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        sections,
        vec!["Controls", "General", "Utility Specifications", OPTIONS_SECTION, "Uncategorized"]
    );
    assert_eq!(
        layout.keys(),
        vec!["f0012", "estop_check", "machine", "customer", "voltage", OPTIONS_SUMMARY_KEY, "broken"]
    );

    assert_eq!(layout.warnings.len(), 1);
    assert_eq!(layout.warnings[0].kind, WarningKind::HierarchyPathMalformed);
    assert_eq!(layout.warnings[0].location, "broken");

    let voltage = &layout.sections[2].subsections[0].fields[0];
    assert!(voltage.suspicious);
}

#[test]
fn catalogue_offers_missing_fields() {
    let mapping = parse_field_order_json(FIELD_ORDER).unwrap();
    let resolver = FieldHierarchyResolver::new(&mapping, None);
    let rec = record(&[("customer", "Acme"), ("estop_check", "YES"), ("broken", "")]);
    let catalogue = resolver.catalogue(&rec);
    assert_eq!(catalogue.keys(), vec!["machine", "f0012", "voltage", OPTIONS_SUMMARY_KEY]);
}

#[test]
fn edit_session_records_modifications() {
    let original = record(&[("f0012", "NO"), ("voltage", "480V"), ("customer", "Acme")]);
    let edited = record(&[("f0012", "YES"), ("voltage", "480V"), ("customer", "Acme Beverages")]);

    let changes = diff_records(&original, &edited);
    assert_eq!(changes.len(), 2);
    assert_eq!(changes["f0012"].original_value, "NO");
    assert_eq!(changes["f0012"].new_value, "YES");

    let when = Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap();
    let mut store = InMemoryModificationStore::new();
    let written = store
        .upsert_all(build_modifications(42, &changes, "customer correction", "sales", when))
        .unwrap();
    assert_eq!(written, 2);
    assert_eq!(store.get(42, "customer").unwrap().new_value, "Acme Beverages");

    // Saving the edited record again changes nothing.
    let saved = apply_changes(&original, &changes);
    assert!(diff_records(&saved, &edited).is_empty());
}
