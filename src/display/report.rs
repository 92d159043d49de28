//! Report formatting utilities for terminal output

use crate::archive::{CaptureReport, EnforcementReport, RestoreCandidates, RestoreResult};
use crate::display::catalog::format_entry_line;

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_capture_report(report: &CaptureReport) -> String {
    if report.source_unavailable {
        return "Source directory does not exist yet, nothing captured.".to_string();
    }

    let mut output = format!("Captured {} file(s)", report.written.len());
    for failure in &report.failures {
        output.push_str(&format!("\n  failed: {}", failure));
    }
    output
}

pub fn format_enforcement_report(report: &EnforcementReport, max_total_bytes: u64) -> String {
    let mut output = format!(
        "Archive size: {} (budget {})",
        format_size(report.final_bytes),
        format_size(max_total_bytes)
    );

    if !report.evicted.is_empty() {
        output.push_str(&format!("\nEvicted {} old backup(s)", report.evicted.len()));
    }
    if !report.pruned_dirs.is_empty() {
        output.push_str(&format!(
            "\nRemoved {} empty day folder(s)",
            report.pruned_dirs.len()
        ));
    }
    if !report.undecodable.is_empty() {
        output.push_str(&format!(
            "\n{} file(s) in the archive are not named like backups",
            report.undecodable.len()
        ));
    }
    for failure in &report.failures {
        output.push_str(&format!("\n  failed: {}", failure));
    }
    output
}

/// Describe the latest/previous choice for a bucket restore prompt
pub fn format_restore_candidates(candidates: &RestoreCandidates<'_>) -> String {
    let mut output = format!("Latest:   {}", format_entry_line(candidates.latest));
    if let Some(previous) = candidates.previous {
        output.push_str(&format!("\nPrevious: {}", format_entry_line(previous)));
    }
    output
}

pub fn format_restore_result(result: &RestoreResult) -> String {
    format!(
        "Backup restored to: {} ({})",
        result.destination.display(),
        format_size(result.bytes_copied)
    )
}
