use thiserror::Error;

/// Errors raised while writing or reading a report workbook
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),
}

/// Errors raised while collecting log files for a batch
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Zip file error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
