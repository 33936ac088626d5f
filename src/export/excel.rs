use anyhow::Result;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::Exporter;
use crate::aggregate::{group_by_device, DeviceGroup};
use crate::error::ReportError;
use crate::models::{CoverageEntry, FormatType};

/// Excel's limit on worksheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const EMPTY_SHEET_NAME: &str = "No_Data";

/// Rows taken by the device header block and the column header row
pub const HEADER_ROWS: u32 = 6;

const INVALID_SHEET_CHARS: [char; 7] = ['/', '\\', '[', ']', ':', '*', '?'];

pub struct ExcelExporter;

impl Exporter for ExcelExporter {
    fn export(&self, rows: &[CoverageEntry], path: &Path) -> Result<()> {
        let bytes = generate_report(rows)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Build the per-device workbook and return it as xlsx bytes.
///
/// Every device gets its own sheet in first-seen order. Without rows the
/// workbook holds a single empty `No_Data` sheet.
pub fn generate_report(rows: &[CoverageEntry]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();

    if rows.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(EMPTY_SHEET_NAME)?;
        worksheet.write(0, 0, "Section")?;
        worksheet.write(0, 1, "Coverage")?;
        return Ok(workbook.save_to_buffer()?);
    }

    let mut names = SheetNames::default();

    for group in group_by_device(rows) {
        let sheet_name = names.claim(group.device_id);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        write_device_sheet(worksheet, &group)?;
    }

    tracing::debug!(rows = rows.len(), sheets = names.len(), "Generated coverage workbook");

    Ok(workbook.save_to_buffer()?)
}

/// Path of the per-format workbook derived from the requested report path.
///
/// `out/coverage_report.xlsx` becomes `out/coverage_report_4_column.xlsx`.
pub fn format_report_path(path: &Path, format: FormatType) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "coverage_data".to_string());
    path.with_file_name(format!("{}_{}.xlsx", stem, format.file_suffix()))
}

fn write_device_sheet(worksheet: &mut Worksheet, group: &DeviceGroup<'_>) -> Result<(), ReportError> {
    worksheet.set_column_width(0, 16)?;
    worksheet.set_column_width(1, 24)?;

    // Header block
    worksheet.write(0, 0, "Device ID:")?;
    worksheet.write(0, 1, group.device_id)?;
    worksheet.write(1, 0, "Date:")?;
    worksheet.write(1, 1, group.date.unwrap_or("N/A"))?;
    worksheet.write(2, 0, "Filename:")?;
    worksheet.write(2, 1, group.filename)?;
    worksheet.write(3, 0, "Format:")?;
    worksheet.write(3, 1, group.format_type.as_str())?;

    // Row 4 stays blank
    for (col, header) in group.format_type.column_headers().iter().enumerate() {
        worksheet.write(HEADER_ROWS - 1, col as u16, *header)?;
    }

    for (row_num, entry) in group.rows.iter().enumerate() {
        let row = HEADER_ROWS + row_num as u32;
        worksheet.write(row, 0, &entry.section)?;
        for (col, value) in entry.values_for(group.format_type).into_iter().enumerate() {
            worksheet.write(row, col as u16 + 1, value)?;
        }
    }

    Ok(())
}

/// Hands out unique, Excel-safe sheet names.
#[derive(Debug, Default)]
struct SheetNames {
    taken: HashSet<String>,
}

impl SheetNames {
    fn len(&self) -> usize {
        self.taken.len()
    }

    fn claim(&mut self, device_id: &str) -> String {
        let base = sanitize_sheet_name(device_id);
        let mut name = base.clone();
        let mut counter = 2;

        // Excel compares sheet names case-insensitively
        while self.taken.contains(&name.to_lowercase()) {
            let suffix = format!("_{}", counter);
            let keep = MAX_SHEET_NAME_LEN - suffix.len();
            name = format!("{}{}", truncate_chars(&base, keep), suffix);
            counter += 1;
        }

        self.taken.insert(name.to_lowercase());
        name
    }
}

/// Replace characters Excel rejects in sheet names and cut to 31 characters
pub fn sanitize_sheet_name(device_id: &str) -> String {
    let cleaned: String = device_id
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    if cleaned.is_empty() {
        return "Device".to_string();
    }

    truncate_chars(cleaned, MAX_SHEET_NAME_LEN)
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_sheet_name("A9/VE\\0T"), "A9_VE_0T");
        assert_eq!(sanitize_sheet_name("a[b]:c*d?"), "a_b__c_d_");
        assert_eq!(sanitize_sheet_name(""), "Device");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "A".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).len(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_format_report_path() {
        assert_eq!(
            format_report_path(Path::new("out/coverage_report.xlsx"), FormatType::OneColumn),
            PathBuf::from("out/coverage_report_1_column.xlsx")
        );
        assert_eq!(
            format_report_path(Path::new("report"), FormatType::FourColumn),
            PathBuf::from("report_4_column.xlsx")
        );
    }

    #[test]
    fn test_collisions_get_suffix() {
        let mut names = SheetNames::default();
        let long = format!("{}X", "A".repeat(31));
        let other = format!("{}Y", "A".repeat(31));

        assert_eq!(names.claim("A/1"), "A_1");
        assert_eq!(names.claim("A\\1"), "A_1_2");
        assert_eq!(names.claim("a_1"), "a_1_3");

        let first = names.claim(&long);
        let second = names.claim(&other);
        assert_eq!(first, "A".repeat(31));
        assert_eq!(second, format!("{}_2", "A".repeat(29)));
        assert!(second.len() <= MAX_SHEET_NAME_LEN);
    }
}
