//! End-to-end extraction tests over complete log files

mod common;

use common::*;
use coverage_extractor::extractor::{detect_format_type, extract_device_id};
use coverage_extractor::{process_file, CoverageRow, FormatType};

#[test]
fn test_one_column_log() {
    let record = process_file(ONE_COLUMN_LOG, "upload.txt");

    assert_eq!(record.device_id.as_deref(), Some("A9VE0T1000157"));
    assert_eq!(record.date.as_deref(), Some("30/11/2024 14:56"));
    assert_eq!(record.format_type, FormatType::OneColumn);

    let sections: Vec<&str> = record.coverage_rows.iter().map(|r| r.section.as_str()).collect();
    assert_eq!(sections, vec!["Total", "0K-1000K", "1000K-2000K", "2000K-3000K"]);
    assert_eq!(record.coverage_rows[0], CoverageRow::total([22.75, 0.0, 0.0, 0.0]));
    assert!(record.coverage_rows.iter().all(|r| r.coverage_m == 0.0 && r.coverage_k == 0.0));
}

#[test]
fn test_four_column_log() {
    let record = process_file(FOUR_COLUMN_LOG, "upload.log");

    assert_eq!(record.device_id.as_deref(), Some("A7990T1000233"));
    assert_eq!(record.date.as_deref(), Some("4/07/2025 20:48"));
    assert_eq!(record.format_type, FormatType::FourColumn);
    assert_eq!(
        record.coverage_rows,
        vec![
            CoverageRow::total([6.5, 8.5, 10.5, 12.5]),
            CoverageRow::section("0K-500K", [1.5, 2.5, 3.5, 4.5]),
            CoverageRow::section("500K-1000K", [5.0, 6.0, 7.0, 8.0]),
        ]
    );
    assert!(record.diagnostics.has_total_row);
    assert_eq!(record.diagnostics.coverage_rows_found, 3);
}

#[test]
fn test_removing_four_column_header_switches_format() {
    assert_eq!(detect_format_type(FOUR_COLUMN_LOG), FormatType::FourColumn);

    let stripped = FOUR_COLUMN_LOG.replace(
        "Coverage Y(%)    Coverage M(%)    Coverage C(%)    Coverage K(%)",
        "Coverage(%)",
    );
    assert_eq!(detect_format_type(&stripped), FormatType::OneColumn);
}

#[test]
fn test_device_id_pattern_priority() {
    let text = "Old board A7990T1000233\nNew board A9VE0T1000157\n";
    assert_eq!(extract_device_id(text).as_deref(), Some("A9VE0T1000157"));
}

#[test]
fn test_embedded_device_id_with_short_table() {
    let text = format!("Unit A9VE0T1000157\n{}", ANONYMOUS_LOG);
    let record = process_file(&text, "x.txt");

    assert_eq!(record.device_id.as_deref(), Some("A9VE0T1000157"));
    assert_eq!(record.format_type, FormatType::OneColumn);
    assert_eq!(
        record.coverage_rows,
        vec![
            CoverageRow::total([60.0, 0.0, 0.0, 0.0]),
            CoverageRow::section("10K-20K", [55.0, 0.0, 0.0, 0.0]),
        ]
    );
}

#[test]
fn test_filename_supplies_missing_fields() {
    let record = process_file(ANONYMOUS_LOG, "exports/A92W0T1000173_2024_1130_1456.txt");

    assert_eq!(record.device_id.as_deref(), Some("A92W0T1000173"));
    assert_eq!(record.date.as_deref(), Some("30/11/2024 14:56"));
    assert!(record.is_usable());
}

#[test]
fn test_windows_line_endings() {
    let text = ONE_COLUMN_LOG.replace('\n', "\r\n");
    let record = process_file(&text, "crlf.txt");

    assert_eq!(record.coverage_rows.len(), 4);
    assert_eq!(record.date.as_deref(), Some("30/11/2024 14:56"));
}

#[test]
fn test_file_without_table_is_unusable() {
    let record = process_file(NO_TABLE_LOG, "a.txt");

    assert_eq!(record.device_id.as_deref(), Some("A92W0T1000173"));
    assert!(record.coverage_rows.is_empty());
    assert!(!record.is_usable());
}
