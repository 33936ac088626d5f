use regex::Regex;
use std::sync::LazyLock;

use crate::models::FormatType;

/// Device ID shapes in priority order, e.g. A9VE0T1000157, A7V0041000334, A7990T1000233
static DEVICE_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"A\d{1,2}[A-Z]{1,4}\d{1,2}T\d{7}").expect("Failed to compile regex"),
        Regex::new(r"A\d{1,2}[A-Z]{1,4}\d{9,12}").expect("Failed to compile regex"),
        Regex::new(r"A\d{2,4}T\d{7}").expect("Failed to compile regex"),
    ]
});

/// Date shapes tried on each header line, most specific first
static DATE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(\d{2}/\d{2}/\d{4})\s+(\d{2}:\d{2})").expect("Failed to compile regex"),
        Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})\s+(\d{1,2}:\d{2})").expect("Failed to compile regex"),
        Regex::new(r"(\d{2}/\d{2}/\d{4})").expect("Failed to compile regex"),
        Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})").expect("Failed to compile regex"),
    ]
});

/// YYYY_MMDD_HHMM as written by the report generators into file names
static FILENAME_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})_(\d{2})(\d{2})_(\d{2})(\d{2})").expect("Failed to compile regex")
});

const FOUR_COLUMN_HEADER: &str =
    "Coverage Y(%)    Coverage M(%)    Coverage C(%)    Coverage K(%)";

/// Number of leading lines searched for a report date
const DATE_SEARCH_LINES: usize = 10;

fn first_device_id(haystack: &str) -> Option<String> {
    DEVICE_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(haystack))
        .map(|m| m.as_str().to_string())
}

/// Find the device ID in the file content.
///
/// Each pattern is tried against the whole text before falling back to the
/// next one, so a lower-priority shape earlier in the file never wins over
/// a higher-priority shape further down.
pub fn extract_device_id(content: &str) -> Option<String> {
    first_device_id(content)
}

pub fn extract_device_id_from_filename(filename: &str) -> Option<String> {
    first_device_id(filename)
}

/// Find the report date in the first lines of the content.
///
/// Returns `"<date> <time>"` when the line carries a time, else the date alone.
pub fn extract_date(content: &str) -> Option<String> {
    for line in content.lines().take(DATE_SEARCH_LINES) {
        for pattern in DATE_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(line) {
                let date = &captures[1];
                return Some(match captures.get(2) {
                    Some(time) => format!("{} {}", date, time.as_str()),
                    None => date.to_string(),
                });
            }
        }
    }

    None
}

/// Rebuild a `DD/MM/YYYY HH:MM` date from a `YYYY_MMDD_HHMM` file name stamp
pub fn extract_date_from_filename(filename: &str) -> Option<String> {
    let captures = FILENAME_DATE_PATTERN.captures(filename)?;
    let (year, month, day, hour, minute) = (
        &captures[1],
        &captures[2],
        &captures[3],
        &captures[4],
        &captures[5],
    );

    Some(format!("{}/{}/{} {}:{}", day, month, year, hour, minute))
}

/// Decide which table layout the file uses.
///
/// Anything without the exact 4-column header is treated as 1-column,
/// including files that carry no coverage header at all.
pub fn detect_format_type(content: &str) -> FormatType {
    if content.contains(FOUR_COLUMN_HEADER) {
        FormatType::FourColumn
    } else {
        FormatType::OneColumn
    }
}
