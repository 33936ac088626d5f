use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::Exporter;
use crate::aggregate::{summary, Summary};
use crate::models::CoverageEntry;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Local>,
    summary: Summary,
    rows: &'a [CoverageEntry],
}

pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn to_json(&self, rows: &[CoverageEntry]) -> Result<String> {
        let report = JsonReport {
            generated_at: Local::now(),
            summary: summary(rows),
            rows,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };

        Ok(json)
    }
}

impl Exporter for JsonExporter {
    fn export(&self, rows: &[CoverageEntry], path: &Path) -> Result<()> {
        let json = self.to_json(rows)?;

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
