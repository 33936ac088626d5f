use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{CoverageEntry, DeviceRecord, FormatType};

/// Optional device, date and format restrictions applied before reporting.
///
/// Empty strings behave like no filter at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub device: Option<String>,
    pub date: Option<String>,
    pub format: Option<FormatType>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_format(mut self, format: FormatType) -> Self {
        self.format = Some(format);
        self
    }

    pub fn matches(&self, entry: &CoverageEntry) -> bool {
        self.device.as_deref().map_or(true, |d| entry.matches_device(d))
            && self.date.as_deref().map_or(true, |d| entry.matches_date(d))
            && self.format.map_or(true, |f| entry.format_type == f)
    }
}

/// Counts over a set of flattened rows
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total_devices: usize,
    pub total_sections: usize,
    pub total_files: usize,
}

pub fn summary(rows: &[CoverageEntry]) -> Summary {
    let devices: HashSet<&str> = rows
        .iter()
        .map(|row| row.device_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    let files: HashSet<&str> = rows.iter().map(|row| row.filename.as_str()).collect();

    Summary {
        total_devices: devices.len(),
        total_sections: rows.len(),
        total_files: files.len(),
    }
}

/// Rows of one device plus the header details taken from its first row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceGroup<'a> {
    pub device_id: &'a str,
    pub date: Option<&'a str>,
    pub filename: &'a str,
    pub format_type: FormatType,
    pub rows: Vec<&'a CoverageEntry>,
}

/// Group rows by device, keeping devices in first-seen order
pub fn group_by_device(rows: &[CoverageEntry]) -> Vec<DeviceGroup<'_>> {
    let mut groups: Vec<DeviceGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.device_id.as_str()).or_insert_with(|| {
            groups.push(DeviceGroup {
                device_id: &row.device_id,
                date: row.date.as_deref(),
                filename: &row.filename,
                format_type: row.format_type,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row);
    }

    groups
}

/// Accumulates accepted records for one reporting session.
#[derive(Debug, Clone, Default)]
pub struct AggregatedStore {
    entries: Vec<CoverageEntry>,
}

impl AggregatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a record into the store.
    ///
    /// Returns `false` and stores nothing when the record has no device ID or
    /// no coverage rows.
    pub fn add_record(&mut self, record: &DeviceRecord) -> bool {
        let device_id = match record.device_id.as_deref() {
            Some(id) if !record.coverage_rows.is_empty() => id,
            _ => {
                tracing::debug!(filename = %record.filename, "Rejected record without device ID or coverage rows");
                return false;
            }
        };

        self.entries.extend(
            record
                .coverage_rows
                .iter()
                .map(|row| CoverageEntry::from_row(record, device_id, row)),
        );

        true
    }

    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply_filters(&self, filter: &RowFilter) -> Vec<CoverageEntry> {
        self.entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Summary {
        summary(&self.entries)
    }

    pub fn by_device(&self) -> Vec<DeviceGroup<'_>> {
        group_by_device(&self.entries)
    }

    pub fn unique_devices(&self) -> Vec<String> {
        self.unique(|entry| Some(entry.device_id.as_str()))
    }

    pub fn unique_dates(&self) -> Vec<String> {
        self.unique(|entry| entry.date.as_deref())
    }

    pub fn unique_sections(&self) -> Vec<String> {
        self.unique(|entry| Some(entry.section.as_str()))
    }

    /// Formats present in the store, 1-column first
    pub fn formats(&self) -> Vec<FormatType> {
        FormatType::ALL
            .into_iter()
            .filter(|format| self.entries.iter().any(|entry| entry.format_type == *format))
            .collect()
    }

    fn unique<'a, F>(&'a self, key: F) -> Vec<String>
    where
        F: Fn(&'a CoverageEntry) -> Option<&'a str>,
    {
        self.entries
            .iter()
            .filter_map(key)
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoverageRow;

    fn record(filename: &str, device: Option<&str>, date: Option<&str>, rows: Vec<CoverageRow>) -> DeviceRecord {
        DeviceRecord::new(
            filename.to_string(),
            device.map(str::to_string),
            date.map(str::to_string),
            FormatType::OneColumn,
            rows,
        )
    }

    fn rows(values: &[f64]) -> Vec<CoverageRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| CoverageRow::section(format!("{}K-{}K", i, i + 1), [*v, 0.0, 0.0, 0.0]))
            .collect()
    }

    fn sample_store() -> AggregatedStore {
        let mut store = AggregatedStore::new();
        assert!(store.add_record(&record("a.txt", Some("A9VE0T1000157"), Some("30/11/2024 14:56"), rows(&[1.0, 2.0]))));
        assert!(store.add_record(&record("b.txt", Some("A7990T1000233"), Some("04/07/2025 20:48"), rows(&[3.0]))));
        assert!(store.add_record(&record("c.txt", Some("A9VE0T1000157"), None, rows(&[4.0]))));
        store
    }

    #[test]
    fn test_rejects_unusable_records() {
        let mut store = AggregatedStore::new();
        assert!(!store.add_record(&record("x.txt", None, None, rows(&[1.0]))));
        assert!(!store.add_record(&record("y.txt", Some("A9VE0T1000157"), None, Vec::new())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_same_device_appends() {
        let store = sample_store();
        assert_eq!(store.len(), 4);

        let groups = store.by_device();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].device_id, "A9VE0T1000157");
        assert_eq!(groups[0].rows.len(), 3);
        assert_eq!(groups[0].filename, "a.txt");
        assert_eq!(groups[0].date, Some("30/11/2024 14:56"));
        assert_eq!(groups[1].device_id, "A7990T1000233");
    }

    #[test]
    fn test_filters_combine() {
        let store = sample_store();

        assert_eq!(store.apply_filters(&RowFilter::new()).len(), 4);
        assert_eq!(
            store.apply_filters(&RowFilter::new().with_device("A9VE0T1000157")).len(),
            3
        );
        assert_eq!(store.apply_filters(&RowFilter::new().with_date("2024")).len(), 2);
        assert_eq!(
            store
                .apply_filters(&RowFilter::new().with_device("A7990T1000233").with_date("2024"))
                .len(),
            0
        );
        assert_eq!(store.apply_filters(&RowFilter::new().with_device("")).len(), 4);
    }

    #[test]
    fn test_filter_keeps_insertion_order() {
        let store = sample_store();
        let filtered = store.apply_filters(&RowFilter::new().with_device("A9VE0T1000157"));
        let values: Vec<f64> = filtered.iter().map(|e| e.coverage_y).collect();
        assert_eq!(values, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_summary_counts() {
        let store = sample_store();
        assert_eq!(
            store.summary(),
            Summary {
                total_devices: 2,
                total_sections: 4,
                total_files: 3,
            }
        );
        assert_eq!(summary(&[]), Summary::default());
    }

    #[test]
    fn test_format_filter() {
        let mut store = sample_store();
        let mut four = record("d.txt", Some("A9VE0T1000157"), None, rows(&[5.0]));
        four.format_type = FormatType::FourColumn;
        assert!(store.add_record(&four));

        assert_eq!(store.formats(), vec![FormatType::OneColumn, FormatType::FourColumn]);
        assert_eq!(
            store.apply_filters(&RowFilter::new().with_format(FormatType::OneColumn)).len(),
            4
        );

        let multi = store.apply_filters(&RowFilter::new().with_format(FormatType::FourColumn));
        assert_eq!(multi.len(), 1);
        assert_eq!(multi[0].filename, "d.txt");
        assert_eq!(sample_store().formats(), vec![FormatType::OneColumn]);
    }

    #[test]
    fn test_filter_options() {
        let store = sample_store();
        assert_eq!(store.unique_devices(), vec!["A7990T1000233", "A9VE0T1000157"]);
        assert_eq!(store.unique_dates(), vec!["04/07/2025 20:48", "30/11/2024 14:56"]);
        assert_eq!(store.unique_sections(), vec!["0K-1K", "1K-2K"]);
    }
}
