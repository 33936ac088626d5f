pub mod csv;
pub mod excel;
pub mod json;
pub mod reader;

use anyhow::Result;
use std::path::Path;

use crate::models::CoverageEntry;

pub use excel::{generate_report, ExcelExporter};
pub use reader::{read_report, ReportCell, ReportSheet};

pub trait Exporter {
    fn export(&self, rows: &[CoverageEntry], path: &Path) -> Result<()>;
}
