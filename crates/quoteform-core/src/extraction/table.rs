use crate::extraction::TableGrid;
use crate::parsing::header::{resolve_headers, DESCRIPTION_HEADERS, PRICE_HEADERS, QUANTITY_HEADERS};

/// Reconstruct tables from pdftotext -layout output.
///
/// pdftotext -layout preserves column alignment using spaces. A table starts
/// at a line whose gap-separated segments read as a quote-table header; its
/// segments fix the column positions for the following lines. The table ends
/// at two consecutive blank lines, the next header line, or the end of page.
/// Header words inside a data row ("Item 2: Change parts ... Price on
/// request") do not open a table, see [`is_header_line`].
pub fn reconstruct_tables(lines: &[String]) -> Vec<TableGrid> {
    let mut tables = Vec::new();
    let mut current: Option<(Vec<usize>, TableGrid)> = None;
    let mut blank_run = 0;

    for line in lines {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run >= 2 {
                if let Some((_, grid)) = current.take() {
                    tables.push(grid);
                }
            }
            continue;
        }
        blank_run = 0;

        let segments = split_segments(line);
        let as_cells: Vec<Option<String>> = segments.iter().map(|s| Some(s.text.to_string())).collect();

        if is_header_line(&segments) && resolve_headers(&as_cells).is_some() {
            if let Some((_, grid)) = current.take() {
                tables.push(grid);
            }
            let starts = segments.iter().map(|s| s.start).collect();
            current = Some((starts, vec![as_cells]));
            continue;
        }

        if let Some((starts, grid)) = current.as_mut() {
            grid.push(assign_columns(&segments, starts));
        }
    }

    if let Some((_, grid)) = current {
        tables.push(grid);
    }
    tables
}

/// A header line has at least two segments, no digits, and no segment that
/// reads as more than one column role.
fn is_header_line(segments: &[Segment<'_>]) -> bool {
    segments.len() >= 2
        && segments.iter().all(|seg| {
            let lower = seg.text.to_lowercase();
            let roles = [DESCRIPTION_HEADERS, QUANTITY_HEADERS, PRICE_HEADERS]
                .iter()
                .filter(|words| words.iter().any(|w| lower.contains(w)))
                .count();
            roles <= 1 && !lower.chars().any(|c| c.is_ascii_digit())
        })
}

/// A run of text separated from its neighbours by 2+ spaces.
/// `start`/`end` are character columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

/// Split a line by gaps of 2+ whitespace characters, keeping column positions.
pub fn split_segments(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut gap_start = (0, 0);
    let mut gap_len = 0;

    for (col, (byte, c)) in line.char_indices().enumerate() {
        if c.is_whitespace() {
            if gap_len == 0 {
                gap_start = (byte, col);
            }
            gap_len += 1;
            if gap_len == 2 {
                if let Some((seg_byte, seg_col)) = start.take() {
                    segments.push(Segment {
                        start: seg_col,
                        end: gap_start.1,
                        text: &line[seg_byte..gap_start.0],
                    });
                }
            }
        } else {
            if start.is_none() {
                start = Some((byte, col));
            }
            gap_len = 0;
        }
    }

    if let Some((seg_byte, seg_col)) = start {
        let text = line[seg_byte..].trim_end();
        segments.push(Segment {
            start: seg_col,
            end: seg_col + text.chars().count(),
            text,
        });
    }

    segments
}

/// Place segments into columns by their overlap with the header columns.
/// Column `i` spans from its header's start to the next header's start; the
/// first column also takes everything left of it.
fn assign_columns(segments: &[Segment<'_>], starts: &[usize]) -> Vec<Option<String>> {
    let mut cells: Vec<Option<String>> = vec![None; starts.len()];

    for seg in segments {
        let mut best = 0;
        let mut best_overlap = 0;
        for i in 0..starts.len() {
            let lo = if i == 0 { 0 } else { starts[i] };
            let hi = starts.get(i + 1).copied().unwrap_or(usize::MAX);
            let overlap = seg.end.min(hi).saturating_sub(seg.start.max(lo));
            if overlap > best_overlap {
                best = i;
                best_overlap = overlap;
            }
        }

        let cell = &mut cells[best];
        *cell = Some(match cell.take() {
            Some(existing) => format!("{existing} {}", seg.text),
            None => seg.text.to_string(),
        });
    }

    cells
}
