use crate::extraction::PageContent;
use tracing::debug;

/// Phrases that end a contextual block: section boundaries of a quote.
pub const GENERAL_STOP_PHRASES: &[&str] = &[
    "equipment configuration and price",
    "total price",
    "terms and conditions",
    "payment terms",
    "lead time",
    "validity",
    "optional accessories",
    "spare parts kit",
    "extended warranty",
    "start up and commissioning",
    "validation package",
    "technical specifications",
    "general specifications",
    "machine specifications",
];

/// Bounds for one contextual capture.
#[derive(Debug, Clone, Copy)]
pub struct ContextLimits {
    /// Pages after the trigger page that capture may run into.
    pub page_span: usize,
    /// Leading characters of other items' first lines used as stop markers.
    pub stop_marker_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        ContextLimits {
            page_span: 2,
            stop_marker_chars: 70,
        }
    }
}

/// Stop markers built from the other selected items.
///
/// Descriptions starting with the trigger belong to the item being captured
/// and are left out so the capture does not end on its own header.
pub fn stop_markers(trigger: &str, all_descriptions: &[String], marker_chars: usize) -> Vec<String> {
    let trigger_lower = trigger.trim().to_lowercase();

    let mut markers: Vec<String> = GENERAL_STOP_PHRASES.iter().map(|s| s.to_string()).collect();
    for desc in all_descriptions {
        if desc.to_lowercase().starts_with(&trigger_lower) {
            continue;
        }
        let first_line = desc.lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            continue;
        }
        markers.push(first_line.to_lowercase().chars().take(marker_chars).collect());
    }
    markers
}

/// Capture the free text that follows the line naming an item.
///
/// Capture starts after the first line containing `trigger` (case-insensitive)
/// and ends at the first stop marker, or after `limits.page_span` pages past
/// the trigger page. Returns an empty string when the trigger never appears.
pub fn collect_context(
    pages: &[PageContent],
    trigger: &str,
    all_descriptions: &[String],
    limits: ContextLimits,
) -> String {
    let trigger_lower = trigger.trim().to_lowercase();
    if trigger_lower.is_empty() {
        return String::new();
    }

    let markers = stop_markers(trigger, all_descriptions, limits.stop_marker_chars);
    let mut captured: Vec<&str> = Vec::new();
    let mut trigger_page: Option<usize> = None;

    'pages: for (page_idx, page) in pages.iter().enumerate() {
        if let Some(start) = trigger_page {
            if page_idx > start + limits.page_span {
                debug!(trigger, "context capture stopped by page limit");
                break;
            }
        }

        for line in &page.lines {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();

            if trigger_page.is_none() {
                if lower.contains(&trigger_lower) {
                    trigger_page = Some(page_idx);
                }
                continue;
            }

            if let Some(marker) = markers.iter().find(|m| lower.contains(m.as_str())) {
                debug!(trigger, marker = marker.as_str(), "context capture stopped by marker");
                break 'pages;
            }
            captured.push(text);
        }
    }

    captured.join("\n")
}
