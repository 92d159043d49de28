//! Catalog display formatting
//!
//! Buckets render as `{date} - {n} backup(s) - {size} MB`, entries as
//! `{sequence}) {YYYY.MM.DD Weekday - HH:MM:SS}`.

use chrono::NaiveDateTime;

use crate::archive::{ArchiveEntry, Bucket, Catalog};
use crate::config::settings::BYTES_PER_MB;

/// Human-facing capture timestamp
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y.%m.%d %A - %H:%M:%S").to_string()
}

/// Summary line for one day bucket
pub fn format_bucket_line(bucket: &Bucket) -> String {
    format!(
        "{} - {} backup(s) - {:.2} MB",
        bucket.label(),
        bucket.entry_count(),
        bucket.total_bytes() as f64 / BYTES_PER_MB as f64
    )
}

/// Line for one archived entry
pub fn format_entry_line(entry: &ArchiveEntry) -> String {
    format!("{}) {}", entry.sequence, format_timestamp(&entry.captured_at))
}

/// Render the whole catalog as an indented tree
pub fn format_catalog(catalog: &Catalog, verbose: bool) -> String {
    if catalog.is_empty() {
        return "No backups found.".to_string();
    }

    let mut output = String::new();
    for bucket in &catalog.buckets {
        output.push_str(&format_bucket_line(bucket));
        output.push('\n');

        for entry in &bucket.entries {
            output.push_str("    ");
            output.push_str(&format_entry_line(entry));
            if verbose {
                output.push_str(&format!(
                    "  {}  {} bytes",
                    entry.original_name, entry.size_bytes
                ));
            }
            output.push('\n');
        }
    }

    output.push_str(&format!(
        "\nTotal: {} backup(s) in {} day(s), {:.2} MB",
        catalog.entry_count(),
        catalog.buckets.len(),
        catalog.total_bytes() as f64 / BYTES_PER_MB as f64
    ));
    output
}
