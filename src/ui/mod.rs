//! User interface module - terminal and machine-readable output.
//!
//! Separates concerns:
//! - `formatter` - Human-readable rendering
//! - This module - Choosing between human and JSON output

use anyhow::Result;

use crate::cli::CleanupOutcome;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_notice, display_outcome, display_plan, display_success,
    display_summary, format_plan,
};

/// Serialize an outcome as a single JSON document.
pub fn outcome_json(outcome: &CleanupOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Print the outcome, as JSON on stdout when `json` is set.
///
/// Notices still go to stderr in JSON mode so stdout stays parseable.
pub fn render_outcome(outcome: &CleanupOutcome, json: bool) -> Result<()> {
    if json {
        for notice in outcome.notices() {
            display_notice(&notice);
        }
        println!("{}", outcome_json(outcome)?);
    } else {
        display_outcome(outcome);
    }
    Ok(())
}
