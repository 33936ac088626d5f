//! Coverage Extractor - pulls ink coverage tables out of printer log files
//! and builds per-device Excel reports.
//!
//! ## Module Structure
//!
//! - [`extractor`] - device ID, date, format detection and coverage table parsing
//! - [`models`] - records and rows produced by the extractor
//! - [`aggregate`] - session store, filters and summaries
//! - [`export`] - Excel report generation and CSV/JSON exports
//! - [`ingest`] - decoding and batch processing of files, folders and zip archives
//! - [`config`] - persisted export settings

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod ingest;
pub mod models;

pub use aggregate::{AggregatedStore, RowFilter, Summary};
pub use extractor::process_file;
pub use ingest::{BatchOutcome, BatchProcessor};
pub use models::{CoverageEntry, CoverageRow, DeviceRecord, FormatType};
