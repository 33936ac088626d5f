pub mod coverage;

pub use coverage::{CoverageEntry, CoverageRow, DeviceRecord, Diagnostics, FormatType};
