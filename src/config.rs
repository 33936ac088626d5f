use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::csv::CsvExporter;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub export_excel: bool,
    pub export_csv: bool,
    pub export_json: bool,
    pub csv_delimiter: char,
    pub csv_bom: bool,
    pub pretty_json: bool,
    pub last_export_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_excel: true,
            export_csv: false,
            export_json: false,
            csv_delimiter: ',',
            csv_bom: true,
            pretty_json: true,
            last_export_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read a config file, falling back to defaults when it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "coverage", "coverage-extractor")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// CSV exporter for these settings; a non-ASCII delimiter falls back to `,`
    pub fn csv_exporter(&self) -> CsvExporter {
        let delimiter = u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or(b',');

        CsvExporter::new().with_delimiter(delimiter).with_bom(self.csv_bom)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.export_excel && !self.export_csv && !self.export_json {
            errors.push("At least one export format must be selected".to_string());
        }

        if !self.csv_delimiter.is_ascii() || self.csv_delimiter.is_ascii_alphanumeric() {
            errors.push(format!(
                "CSV delimiter must be an ASCII punctuation or whitespace character, got {:?}",
                self.csv_delimiter
            ));
        }

        errors
    }
}
