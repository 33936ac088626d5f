use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

use super::excel::HEADER_ROWS;
use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Empty,
    Text(String),
    Number(f64),
}

impl ReportCell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&Data> for ReportCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => Self::Empty,
            Data::String(text) => Self::Text(text.clone()),
            Data::Float(value) => Self::Number(*value),
            Data::Int(value) => Self::Number(*value as f64),
            other => Self::Text(other.to_string()),
        }
    }
}

/// One worksheet of a generated report, read back as a cell grid
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub name: String,
    pub rows: Vec<Vec<ReportCell>>,
}

impl ReportSheet {
    fn header_value(&self, row: usize) -> Option<&str> {
        self.rows.get(row)?.get(1)?.as_text()
    }

    pub fn device_id(&self) -> Option<&str> {
        self.header_value(0)
    }

    pub fn date(&self) -> Option<&str> {
        self.header_value(1)
    }

    pub fn filename(&self) -> Option<&str> {
        self.header_value(2)
    }

    pub fn format(&self) -> Option<&str> {
        self.header_value(3)
    }

    /// Coverage rows below the header block
    pub fn data_rows(&self) -> &[Vec<ReportCell>] {
        self.rows.get(HEADER_ROWS as usize..).unwrap_or(&[])
    }
}

/// Read every sheet of an xlsx workbook held in memory
pub fn read_report(bytes: &[u8]) -> Result<Vec<ReportSheet>, ReportError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let (first_row, first_col) = range.start().unwrap_or((0, 0));

        let mut rows: Vec<Vec<ReportCell>> = (0..first_row).map(|_| Vec::new()).collect();
        for row in range.rows() {
            let mut cells = vec![ReportCell::Empty; first_col as usize];
            cells.extend(row.iter().map(ReportCell::from));
            rows.push(cells);
        }

        sheets.push(ReportSheet { name, rows });
    }

    Ok(sheets)
}
