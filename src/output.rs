//! CLI output formatting.
//!
//! Formatting is split from printing: every `format_*` function is pure and
//! returns the lines to show, so the wording is unit tested without capturing
//! stdout. The `print_*` wrappers are what the binary calls.
//!
//! # Output Format
//!
//! ```text
//! Processing photos/a.jpg -> out/a.webp
//! Processing photos/b.jpg -> out/b.webp
//! Warning: photos/b.jpg: Invalid resize format: big
//! Processing photos/c.jpg -> out/c.webp
//! Failed to process photos/c.jpg: Decode error in photos/c.jpg: ...
//! 2 converted, 1 failed (3 total)
//! Image processing complete.
//! ```
//!
//! Progress lines go to stdout. Warnings and failures go to stderr.

use crate::batch::BatchReport;
use crate::process::ProcessEvent;

/// Final line of every successful invocation.
pub const COMPLETION_MESSAGE: &str = "Image processing complete.";

// ============================================================================
// Process events
// ============================================================================

/// Lines for one pipeline event.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { input, output } => {
            vec![format!(
                "Processing {} -> {}",
                input.display(),
                output.display()
            )]
        }
        ProcessEvent::Warning { input, warning } => {
            vec![format!("Warning: {}: {}", input.display(), warning)]
        }
        ProcessEvent::Failed { input, error } => {
            vec![format!("Failed to process {}: {}", input.display(), error)]
        }
    }
}

/// Whether an event belongs on stderr.
pub fn is_diagnostic(event: &ProcessEvent) -> bool {
    !matches!(event, ProcessEvent::Started { .. })
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        if is_diagnostic(event) {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

// ============================================================================
// Batch summary
// ============================================================================

/// Summary after a batch: counts, then the failed inputs again so they are
/// not lost in a long progress log.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![report.to_string()];
    if report.failed() > 0 {
        lines.push("Failed:".to_string());
        for outcome in report.failures() {
            lines.push(format!("    {}", outcome.input.display()));
        }
    }
    lines
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{line}");
    }
}

// ============================================================================
// Tests
// ============================================================================
