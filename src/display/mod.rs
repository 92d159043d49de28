//! Display formatting for terminal output
//!
//! Renders the catalog and the engine's reports as plain text.

pub mod catalog;
pub mod report;

pub use catalog::{format_bucket_line, format_catalog, format_entry_line, format_timestamp};
pub use report::{
    format_capture_report, format_enforcement_report, format_restore_candidates,
    format_restore_result, format_size,
};
