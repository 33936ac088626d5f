pub mod patterns;
pub mod table;

pub use patterns::{
    detect_format_type, extract_date, extract_date_from_filename, extract_device_id,
    extract_device_id_from_filename,
};
pub use table::extract_coverage_rows;

use crate::models::DeviceRecord;

/// Build the record for one decoded log file.
///
/// Never fails: anything that can't be found is left empty and the caller
/// decides whether the record is usable.
pub fn process_file(content: &str, filename: &str) -> DeviceRecord {
    let format_type = detect_format_type(content);

    let device_id =
        extract_device_id(content).or_else(|| extract_device_id_from_filename(filename));

    let date = extract_date(content).or_else(|| extract_date_from_filename(filename));

    let coverage_rows = extract_coverage_rows(content, format_type);

    let record = DeviceRecord::new(
        filename.to_string(),
        device_id,
        date,
        format_type,
        coverage_rows,
    );

    tracing::debug!(
        filename,
        device_id_found = record.diagnostics.device_id_found,
        date_found = record.diagnostics.date_found,
        coverage_rows = record.diagnostics.coverage_rows_found,
        format = %record.diagnostics.format_detected,
        has_total_row = record.diagnostics.has_total_row,
        "Processed coverage file"
    );

    record
}
