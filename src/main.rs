use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use coverage_extractor::config::AppConfig;
use coverage_extractor::export::json::JsonExporter;
use coverage_extractor::export::excel::format_report_path;
use coverage_extractor::export::{read_report, ExcelExporter, Exporter, ReportCell};
use coverage_extractor::{BatchOutcome, BatchProcessor, RowFilter};

const DEFAULT_REPORT: &str = "coverage_report.xlsx";

#[derive(Parser)]
#[command(author, version, about = "Printer coverage log extractor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract coverage tables from log files, folders or zip archives
    Process {
        /// .txt/.log/.dat files, folders or .zip archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Base report path; one workbook per format is written next to it
        /// with a `_1_column` / `_4_column` suffix, CSV/JSON use its stem
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only report this device ID
        #[arg(long)]
        device: Option<String>,
        /// Only report rows whose date contains this text
        #[arg(long)]
        date: Option<String>,
        /// Also write a CSV of all rows
        #[arg(long)]
        csv: bool,
        /// Also write a JSON export
        #[arg(long)]
        json: bool,
        /// Skip the Excel report
        #[arg(long)]
        no_excel: bool,
    },
    /// Print the sheets of a generated report
    Inspect { report: PathBuf },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            inputs,
            output,
            device,
            date,
            csv,
            json,
            no_excel,
        } => {
            let mut config = AppConfig::load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                AppConfig::default()
            });
            config.export_excel &= !no_excel;
            config.export_csv |= csv;
            config.export_json |= json;

            let errors = config.validate();
            if !errors.is_empty() {
                anyhow::bail!("Invalid configuration: {}", errors.join("; "));
            }

            let output = report_path(output);
            let filter = RowFilter {
                device,
                date,
                format: None,
            };

            run_process(&inputs, &output, &filter, &config)?;

            config.last_export_path = Some(output.to_string_lossy().to_string());
            if let Err(e) = config.save() {
                tracing::warn!("Failed to save config: {}", e);
            }
            Ok(())
        }
        Commands::Inspect { report } => run_inspect(&report),
    }
}

fn run_process(inputs: &[PathBuf], output: &Path, filter: &RowFilter, config: &AppConfig) -> Result<()> {
    let mut processor = BatchProcessor::new();
    let outcome = processor.process_paths(inputs);
    print_outcome(&outcome);

    let rows = processor.filtered_rows(filter);
    let filtered = processor.filtered_summary(filter);
    if filter.device.is_some() || filter.date.is_some() {
        println!(
            "After filters: {} devices, {} sections, {} files",
            filtered.total_devices, filtered.total_sections, filtered.total_files
        );
    }

    if config.export_excel {
        let reports = processor.generate_format_reports(filter)?;
        if reports.is_empty() {
            ExcelExporter.export(&rows, output)?;
            println!("No coverage data, empty report written to {}", output.display());
        }
        for (format, bytes) in reports {
            let path = format_report_path(output, format);
            std::fs::write(&path, bytes)?;
            println!("{} report written to {}", format, path.display());
        }
    }

    if config.export_csv {
        let path = output.with_extension("csv");
        config.csv_exporter().export(&rows, &path)?;
        println!("CSV written to {}", path.display());
    }

    if config.export_json {
        let path = output.with_extension("json");
        JsonExporter::new().pretty(config.pretty_json).export(&rows, &path)?;
        println!("JSON written to {}", path.display());
    }

    Ok(())
}

/// Reports go to the current directory unless `-o` says otherwise
fn report_path(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT))
}

fn print_outcome(outcome: &BatchOutcome) {
    println!("Files processed: {}", outcome.processed_count);
    println!("Devices: {}", outcome.summary.total_devices);
    println!("Sections: {}", outcome.summary.total_sections);

    if !outcome.failed_files.is_empty() {
        println!("Failed files ({}):", outcome.failed_files.len());
        for failed in &outcome.failed_files {
            println!("  {}", failed);
        }
    }
}

fn run_inspect(report: &Path) -> Result<()> {
    let bytes = std::fs::read(report)?;

    for sheet in read_report(&bytes)? {
        println!("== {}", sheet.name);
        for row in &sheet.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    ReportCell::Empty => String::new(),
                    ReportCell::Text(text) => text.clone(),
                    ReportCell::Number(value) => value.to_string(),
                })
                .collect();
            println!("{}", cells.join("\t"));
        }
    }

    Ok(())
}
