use serde::{Deserialize, Serialize};
use std::fmt;

/// Column layout of a coverage report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FormatType {
    #[default]
    #[serde(rename = "1-column")]
    OneColumn,
    #[serde(rename = "4-column")]
    FourColumn,
}

impl FormatType {
    pub const ALL: [FormatType; 2] = [Self::OneColumn, Self::FourColumn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneColumn => "1-column",
            Self::FourColumn => "4-column",
        }
    }

    /// Column header row used for this layout in the generated report
    pub fn column_headers(&self) -> &'static [&'static str] {
        match self {
            Self::OneColumn => &["Section", "Coverage(%)"],
            Self::FourColumn => &[
                "Section",
                "Coverage Y(%)",
                "Coverage M(%)",
                "Coverage C(%)",
                "Coverage K(%)",
            ],
        }
    }
}

impl FormatType {
    /// Suffix for per-format report files, e.g. `coverage_report_4_column.xlsx`
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::OneColumn => "1_column",
            Self::FourColumn => "4_column",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of a coverage table.
///
/// For 1-column files only `coverage_y` carries a value; the other
/// channels are zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageRow {
    pub section: String,
    pub coverage_y: f64,
    pub coverage_m: f64,
    pub coverage_c: f64,
    pub coverage_k: f64,
    pub is_total: bool,
}

impl CoverageRow {
    pub const TOTAL_LABEL: &'static str = "Total";

    pub fn section(section: impl Into<String>, values: [f64; 4]) -> Self {
        let [coverage_y, coverage_m, coverage_c, coverage_k] = values;
        Self {
            section: section.into(),
            coverage_y,
            coverage_m,
            coverage_c,
            coverage_k,
            is_total: false,
        }
    }

    pub fn total(values: [f64; 4]) -> Self {
        Self {
            is_total: true,
            ..Self::section(Self::TOTAL_LABEL, values)
        }
    }
}

/// Extraction flags kept alongside a record for troubleshooting.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Diagnostics {
    pub device_id_found: bool,
    pub date_found: bool,
    pub coverage_rows_found: usize,
    pub format_detected: FormatType,
    pub has_total_row: bool,
}

/// Everything extracted from a single log file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceRecord {
    pub filename: String,
    pub device_id: Option<String>,
    pub date: Option<String>,
    pub format_type: FormatType,
    pub coverage_rows: Vec<CoverageRow>,
    pub diagnostics: Diagnostics,
}

impl DeviceRecord {
    pub fn new(
        filename: String,
        device_id: Option<String>,
        date: Option<String>,
        format_type: FormatType,
        coverage_rows: Vec<CoverageRow>,
    ) -> Self {
        let diagnostics = Diagnostics {
            device_id_found: device_id.is_some(),
            date_found: date.is_some(),
            coverage_rows_found: coverage_rows.len(),
            format_detected: format_type,
            has_total_row: coverage_rows.iter().any(|row| row.is_total),
        };

        Self {
            filename,
            device_id,
            date,
            format_type,
            coverage_rows,
            diagnostics,
        }
    }

    /// A record can be aggregated only with a device ID and at least one row
    pub fn is_usable(&self) -> bool {
        self.device_id.is_some() && !self.coverage_rows.is_empty()
    }

}

/// A coverage row flattened together with the file it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageEntry {
    pub device_id: String,
    pub date: Option<String>,
    pub filename: String,
    pub format_type: FormatType,
    pub section: String,
    pub coverage_y: f64,
    pub coverage_m: f64,
    pub coverage_c: f64,
    pub coverage_k: f64,
    pub is_total: bool,
}

impl CoverageEntry {
    pub fn from_row(record: &DeviceRecord, device_id: &str, row: &CoverageRow) -> Self {
        Self {
            device_id: device_id.to_string(),
            date: record.date.clone(),
            filename: record.filename.clone(),
            format_type: record.format_type,
            section: row.section.clone(),
            coverage_y: row.coverage_y,
            coverage_m: row.coverage_m,
            coverage_c: row.coverage_c,
            coverage_k: row.coverage_k,
            is_total: row.is_total,
        }
    }

    pub fn date_or_na(&self) -> &str {
        self.date.as_deref().unwrap_or("N/A")
    }

    /// Values as they appear in a report row for the given layout
    pub fn values_for(&self, format: FormatType) -> Vec<f64> {
        match format {
            FormatType::OneColumn => vec![self.coverage_y],
            FormatType::FourColumn => vec![
                self.coverage_y,
                self.coverage_m,
                self.coverage_c,
                self.coverage_k,
            ],
        }
    }

    pub fn matches_device(&self, device: &str) -> bool {
        device.is_empty() || self.device_id == device
    }

    pub fn matches_date(&self, date: &str) -> bool {
        if date.is_empty() {
            return true;
        }

        self.date.as_deref().is_some_and(|d| d.contains(date))
    }
}
