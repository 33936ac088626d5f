use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::aggregate::{summary, AggregatedStore, RowFilter, Summary};
use crate::error::{IngestError, ReportError};
use crate::export::generate_report;
use crate::extractor::process_file;
use crate::models::{CoverageEntry, FormatType};

/// Extensions accepted for log files inside archives and directories
pub const LOG_EXTENSIONS: [&str; 3] = ["txt", "log", "dat"];

/// Decode raw file bytes into text.
///
/// UTF-8 is tried first. Anything else is read as Latin-1, which maps every
/// byte to a character and so never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

pub fn has_log_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOG_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    NoUsableData,
    Error(String),
    /// The archive itself could not be opened
    Archive(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUsableData => write!(f, "No device ID or coverage data found"),
            Self::Error(message) => write!(f, "Error: {}", message),
            Self::Archive(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub name: String,
    pub reason: FailureReason,
}

impl fmt::Display for FailedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.reason)
    }
}

/// Result of one batch of files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub processed_count: usize,
    pub failed_files: Vec<FailedFile>,
    pub summary: Summary,
}

impl BatchOutcome {
    fn archive_failure(archive_name: &str, error: IngestError) -> Self {
        Self {
            processed_count: 0,
            failed_files: vec![FailedFile {
                name: archive_name.to_string(),
                reason: FailureReason::Archive(error.to_string()),
            }],
            summary: Summary::default(),
        }
    }
}

/// One reporting session: feeds decoded files through the extractor and
/// keeps the accepted rows.
#[derive(Debug, Default)]
pub struct BatchProcessor {
    store: AggregatedStore,
}

impl BatchProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &AggregatedStore {
        &self.store
    }

    /// Extract one file and keep it if it is usable
    pub fn process_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), FailureReason> {
        let content = decode_text(bytes);
        let record = process_file(&content, name);

        if self.store.add_record(&record) {
            Ok(())
        } else {
            Err(FailureReason::NoUsableData)
        }
    }

    /// Process in-memory files in the order given
    pub fn process_files<I, N, B>(&mut self, files: I) -> BatchOutcome
    where
        I: IntoIterator<Item = (N, B)>,
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut outcome = BatchOutcome::default();

        for (name, bytes) in files {
            self.record_result(&mut outcome, name.as_ref(), |this, name| {
                this.process_bytes(name, bytes.as_ref())
            });
        }

        self.finish(outcome)
    }

    /// Process every log entry of a zip archive in archive order.
    ///
    /// An archive that can't be opened fails the whole batch.
    pub fn process_zip<R: Read + Seek>(&mut self, reader: R) -> BatchOutcome {
        match self.process_archive(reader) {
            Ok(outcome) => self.finish(outcome),
            Err(e) => {
                tracing::warn!("Failed to open zip archive: {}", e);
                BatchOutcome::archive_failure("archive", e)
            }
        }
    }

    /// Process files, directories and zip archives from disk.
    ///
    /// Directories are read one level deep, sorted by path, and only log
    /// extensions are picked up. Archives contribute their entries in place.
    pub fn process_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for path in expand_paths(paths, &mut outcome.failed_files) {
            let name = path.to_string_lossy().to_string();

            if is_zip(&path) {
                let opened = fs::File::open(&path).map_err(|source| IngestError::Io {
                    path: name.clone(),
                    source,
                });
                let archive_outcome = match opened.and_then(|file| self.process_archive(file)) {
                    Ok(archive_outcome) => archive_outcome,
                    Err(e) => {
                        tracing::warn!("Failed to open zip archive {}: {}", name, e);
                        BatchOutcome::archive_failure(&name, e)
                    }
                };
                outcome.processed_count += archive_outcome.processed_count;
                outcome.failed_files.extend(archive_outcome.failed_files);
                continue;
            }

            self.record_result(&mut outcome, &name, |this, name| {
                let bytes = fs::read(&path).map_err(|source| {
                    FailureReason::Error(
                        IngestError::Io {
                            path: name.to_string(),
                            source,
                        }
                        .to_string(),
                    )
                })?;
                this.process_bytes(name, &bytes)
            });
        }

        self.finish(outcome)
    }

    pub fn filtered_rows(&self, filter: &RowFilter) -> Vec<CoverageEntry> {
        self.store.apply_filters(filter)
    }

    pub fn filtered_summary(&self, filter: &RowFilter) -> Summary {
        summary(&self.filtered_rows(filter))
    }

    pub fn generate_report(&self, filter: &RowFilter) -> Result<Vec<u8>, ReportError> {
        generate_report(&self.filtered_rows(filter))
    }

    /// One workbook per format present after filtering, 1-column first.
    ///
    /// Each workbook only holds rows of its own format, so a device with
    /// files in both layouts keeps all of its values.
    pub fn generate_format_reports(
        &self,
        filter: &RowFilter,
    ) -> Result<Vec<(FormatType, Vec<u8>)>, ReportError> {
        let mut reports = Vec::new();

        for format in self.store.formats() {
            let rows = self.filtered_rows(&filter.clone().with_format(format));
            if rows.is_empty() {
                continue;
            }
            reports.push((format, generate_report(&rows)?));
        }

        Ok(reports)
    }

    fn process_archive<R: Read + Seek>(&mut self, reader: R) -> Result<BatchOutcome, IngestError> {
        let mut archive = ZipArchive::new(reader)?;

        let mut outcome = BatchOutcome::default();

        for index in 0..archive.len() {
            match read_zip_entry(&mut archive, index) {
                Ok(Some((name, bytes))) => {
                    self.record_result(&mut outcome, &name, |this, name| {
                        this.process_bytes(name, &bytes)
                    });
                }
                Ok(None) => {}
                Err((name, e)) => {
                    self.record_result(&mut outcome, &name, |_, _| {
                        Err(FailureReason::Error(e.to_string()))
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn record_result<F>(&mut self, outcome: &mut BatchOutcome, name: &str, process: F)
    where
        F: FnOnce(&mut Self, &str) -> Result<(), FailureReason>,
    {
        match process(self, name) {
            Ok(()) => outcome.processed_count += 1,
            Err(reason) => {
                let failed = FailedFile {
                    name: name.to_string(),
                    reason,
                };
                tracing::warn!("Skipped {}", failed);
                outcome.failed_files.push(failed);
            }
        }
    }

    fn finish(&self, mut outcome: BatchOutcome) -> BatchOutcome {
        outcome.summary = self.store.summary();
        tracing::info!(
            processed = outcome.processed_count,
            failed = outcome.failed_files.len(),
            devices = outcome.summary.total_devices,
            sections = outcome.summary.total_sections,
            "Batch finished"
        );
        outcome
    }
}

type ZipEntry = (String, Vec<u8>);

fn read_zip_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<Option<ZipEntry>, (String, IngestError)> {
    let mut file = archive
        .by_index(index)
        .map_err(|e| (format!("entry #{}", index), IngestError::Zip(e)))?;

    let name = file.name().to_string();
    if file.is_dir() || !has_log_extension(&name) {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| {
        (
            name.clone(),
            IngestError::Io {
                path: name.clone(),
                source,
            },
        )
    })?;

    Ok(Some((name, bytes)))
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn expand_paths<P: AsRef<Path>>(paths: &[P], failed: &mut Vec<FailedFile>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        match fs::read_dir(path) {
            Ok(entries) => {
                let mut found: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| {
                        p.is_file()
                            && (is_zip(p)
                                || p.file_name()
                                    .and_then(|n| n.to_str())
                                    .is_some_and(has_log_extension))
                    })
                    .collect();
                found.sort();
                files.extend(found);
            }
            Err(source) => failed.push(FailedFile {
                name: path.to_string_lossy().to_string(),
                reason: FailureReason::Error(
                    IngestError::Io {
                        path: path.to_string_lossy().to_string(),
                        source,
                    }
                    .to_string(),
                ),
            }),
        }
    }

    files
}
