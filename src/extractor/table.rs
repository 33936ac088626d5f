use regex::Regex;
use std::sync::LazyLock;

use crate::models::{CoverageRow, FormatType};

/// Lines containing any of these end the coverage table (compared lowercase)
const TERMINATORS: [&str; 4] = ["coverage page data", "====", "printer", "custom"];

static ONE_COLUMN: LazyLock<TableLayout> =
    LazyLock::new(|| TableLayout::new("Coverage(%)", 1));

static FOUR_COLUMN: LazyLock<TableLayout> =
    LazyLock::new(|| TableLayout::new("Coverage Y(%)", 4));

/// Header fragment and row shape of one table layout.
struct TableLayout {
    header: &'static str,
    arity: usize,
    section_row: Regex,
    total_row: Regex,
}

impl TableLayout {
    fn new(header: &'static str, arity: usize) -> Self {
        let values = r"\s+(\d+\.?\d*)".repeat(arity);

        Self {
            header,
            arity,
            section_row: Regex::new(&format!(r"^(\d+K-\d+K){}$", values))
                .expect("Failed to compile regex"),
            total_row: Regex::new(&format!(r"(?i)^total{}$", values))
                .expect("Failed to compile regex"),
        }
    }

    fn for_format(format: FormatType) -> &'static Self {
        match format {
            FormatType::OneColumn => &*ONE_COLUMN,
            FormatType::FourColumn => &*FOUR_COLUMN,
        }
    }

    fn is_header(&self, line: &str) -> bool {
        line.contains("Section") && line.contains(self.header)
    }

    /// Parse the captured numeric groups starting at `first`.
    ///
    /// 1-column values land in the Y channel, the rest stay zero.
    fn values(&self, captures: &regex::Captures<'_>, first: usize) -> Option<[f64; 4]> {
        let mut values = [0.0; 4];
        for (slot, index) in values.iter_mut().zip(first..first + self.arity) {
            *slot = captures.get(index)?.as_str().parse().ok()?;
        }
        Some(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    BeforeSection,
    InSection,
    Done,
}

fn is_terminator(line: &str) -> bool {
    let lower = line.to_lowercase();
    TERMINATORS.iter().any(|marker| lower.contains(marker))
}

/// Pull the coverage rows out of a report.
///
/// Rows are only read between the layout's header line and the first
/// terminator line. The last `total` line becomes the first row of the
/// result; section rows follow in file order. Lines that don't fit the
/// layout are skipped.
pub fn extract_coverage_rows(content: &str, format: FormatType) -> Vec<CoverageRow> {
    let layout = TableLayout::for_format(format);

    let mut rows = Vec::new();
    let mut total_row = None;
    let mut state = ScanState::BeforeSection;

    for line in content.lines() {
        if state == ScanState::Done {
            break;
        }

        let line = line.trim();

        if layout.is_header(line) {
            state = ScanState::InSection;
            continue;
        }

        if state == ScanState::BeforeSection {
            continue;
        }

        if line.len() < 3 || line.starts_with('-') {
            continue;
        }

        if is_terminator(line) {
            state = ScanState::Done;
            continue;
        }

        if let Some(captures) = layout.total_row.captures(line) {
            if let Some(values) = layout.values(&captures, 1) {
                total_row = Some(CoverageRow::total(values));
            }
            continue;
        }

        if let Some(captures) = layout.section_row.captures(line) {
            if let Some(values) = layout.values(&captures, 2) {
                rows.push(CoverageRow::section(&captures[1], values));
            }
        }
    }

    if let Some(total) = total_row {
        rows.insert(0, total);
    }

    rows
}
