//! Output formatting and display for pdfstitch.
//!
//! Everything the command line prints to the user goes through here: status
//! messages, the dry-run plan, merge diagnostics and the closing summary.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::output::OutputFormatter;
//! use pdfstitch::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Severity};
use crate::merge::{MergePlan, MergeStatistics, SourceSummary};

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// One line describing where a source lands in the merged document.
pub fn describe_source(summary: &SourceSummary) -> String {
    let pages = match summary.page_count {
        0 => "no pages".to_string(),
        1 => format!("page {}", summary.start_page + 1),
        n => format!(
            "pages {}-{}",
            summary.start_page + 1,
            summary.start_page + n
        ),
    };

    let mut line = format!("{} ({pages})", summary.name);
    if summary.has_outline {
        line.push_str(&format!(", {} outline entries", summary.outline_entries));
    }
    if summary.named_destinations > 0 {
        line.push_str(&format!(
            ", {} named destinations",
            summary.named_destinations
        ));
    }
    line
}

/// Display the dry-run merge plan.
pub fn display_plan(formatter: &OutputFormatter, plan: &MergePlan) {
    formatter.section(&format!(
        "Merge plan: {} file(s), {} pages",
        plan.sources.len(),
        plan.total_pages
    ));

    for (index, summary) in plan.sources.iter().enumerate() {
        formatter.list_item(index + 1, &describe_source(summary));
    }
}

/// Display diagnostics collected during a merge.
///
/// Warnings are always shown; informational reports only in verbose mode.
pub fn display_diagnostics(formatter: &OutputFormatter, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => formatter.warning(&diagnostic.to_string()),
            Severity::Info => formatter.debug(&diagnostic.to_string()),
        }
    }
}

/// Display the closing summary of a merge.
pub fn display_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.success(&format!(
        "Merged {} file(s) into {} pages",
        stats.files_merged, stats.total_pages
    ));

    formatter.detail("Outline entries", &stats.outline_entries.to_string());
    if stats.dropped_outline_entries > 0 {
        formatter.detail(
            "Dropped outline entries",
            &stats.dropped_outline_entries.to_string(),
        );
    }
    formatter.detail("Named destinations", &stats.named_destinations.to_string());
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail(
        "Time",
        &format!(
            "{:.2}s load, {:.2}s merge",
            stats.load_time.as_secs_f64(),
            stats.merge_time.as_secs_f64()
        ),
    );
}
