use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::Exporter;
use crate::models::CoverageEntry;

const HEADERS: [&str; 10] = [
    "Device_ID",
    "Date",
    "Filename",
    "Format_Type",
    "Section",
    "Coverage_Y",
    "Coverage_M",
    "Coverage_C",
    "Coverage_K",
    "Is_Total",
];

/// Writes the flattened rows of every device into one CSV file.
pub struct CsvExporter {
    delimiter: u8,
    with_bom: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: b',',
            with_bom: true,   // UTF-8 BOM for Excel
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn with_bom(mut self, with_bom: bool) -> Self {
        self.with_bom = with_bom;
        self
    }

    pub fn write_to<W: Write>(&self, mut out: W, rows: &[CoverageEntry]) -> Result<()> {
        if self.with_bom {
            out.write_all(&[0xEF, 0xBB, 0xBF])?;
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(out);
        write_rows(&mut writer, rows)?;
        writer.flush()?;
        Ok(())
    }
}

fn write_rows<W: Write>(writer: &mut Writer<W>, rows: &[CoverageEntry]) -> Result<()> {
    writer.write_record(HEADERS)?;

    for entry in rows {
        writer.write_record([
            entry.device_id.clone(),
            entry.date.clone().unwrap_or_default(),
            entry.filename.clone(),
            entry.format_type.to_string(),
            entry.section.clone(),
            entry.coverage_y.to_string(),
            entry.coverage_m.to_string(),
            entry.coverage_c.to_string(),
            entry.coverage_k.to_string(),
            entry.is_total.to_string(),
        ])?;
    }

    Ok(())
}

impl Exporter for CsvExporter {
    fn export(&self, rows: &[CoverageEntry], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormatType;

    fn entry() -> CoverageEntry {
        CoverageEntry {
            device_id: "A9VE0T1000157".to_string(),
            date: None,
            filename: "a.txt".to_string(),
            format_type: FormatType::OneColumn,
            section: "Total".to_string(),
            coverage_y: 60.5,
            coverage_m: 0.0,
            coverage_c: 0.0,
            coverage_k: 0.0,
            is_total: true,
        }
    }

    #[test]
    fn test_csv_without_bom() {
        let mut out = Vec::new();
        CsvExporter::new()
            .with_bom(false)
            .with_delimiter(b';')
            .write_to(&mut out, &[entry()])
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADERS.join(";").as_str()));
        assert_eq!(
            lines.next(),
            Some("A9VE0T1000157;;a.txt;1-column;Total;60.5;0;0;0;true")
        );
    }

    #[test]
    fn test_csv_bom_prefix() {
        let mut out = Vec::new();
        CsvExporter::new().write_to(&mut out, &[]).unwrap();
        assert!(out.starts_with(&[0xEF, 0xBB, 0xBF]));
    }
}
