//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};

pub const ONE_COLUMN_LOG: &str = "\
Printer status report
Serial number: A9VE0T1000157
Printed: 30/11/2024 14:56

Section    Coverage(%)
-----------------------
0K-1000K      12.50
1000K-2000K    7.25
2000K-3000K    3.00
Total         22.75

==== Coverage Page Data ====
3000K-4000K    9.99
";

pub const FOUR_COLUMN_LOG: &str = "\
Device A7990T1000233
Report date 4/07/2025 20:48
Section    Coverage Y(%)    Coverage M(%)    Coverage C(%)    Coverage K(%)
---------------------------------------------------------------------------
0K-500K       1.5      2.5      3.5      4.5
500K-1000K    5.0      6.0      7.0      8.0
total         6.5      8.5     10.5     12.5
Printer settings
0K-500K       9.0      9.0      9.0      9.0
";

/// Coverage table without any device ID; only usable with a named file
pub const ANONYMOUS_LOG: &str = "\
Section    Coverage(%)
10K-20K   55.0
total 60.0
";

pub const NO_TABLE_LOG: &str = "Serial number: A92W0T1000173\nNothing else here\n";

/// Build an in-memory zip archive from (name, contents) pairs
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();

    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), options)
                .expect("Failed to add directory");
        } else {
            writer.start_file(*name, options).expect("Failed to start zip entry");
            writer.write_all(contents).expect("Failed to write zip entry");
        }
    }

    writer.finish().expect("Failed to finish zip").into_inner()
}
