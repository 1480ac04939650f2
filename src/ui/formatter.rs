//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from run control.
//! Human-readable output goes to stdout, errors and notices to stderr.

use console::style;

use crate::cli::CleanupOutcome;
use crate::domain::DeletionPlan;
use crate::notice::RunNotice;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Display a non-fatal notice to the user.
pub fn display_notice(notice: &RunNotice) {
    eprintln!("{} {}", style("⚠ NOTICE:").yellow(), notice);
}

/// Render the versions a plan would delete.
///
/// Returns the text instead of printing it so callers can test the layout.
pub fn format_plan(package: &str, plan: &DeletionPlan) -> String {
    let mut out = format!(
        "Versions of '{}' to delete ({} of {}):\n",
        package,
        plan.len(),
        plan.total()
    );
    for version in plan.versions() {
        out.push_str(&format!("  - {}\n", version));
    }
    out
}

/// Display the preview report for a dry run.
pub fn display_plan(package: &str, plan: &DeletionPlan) {
    println!("\n{}", style("Dry run: nothing will be deleted").bold());
    print!("{}", format_plan(package, plan));
}

/// Display the summary of a live run.
pub fn display_summary(package: &str, total: usize, deleted: &[String]) {
    for version in deleted {
        display_success(&format!("Deleted {} {}", package, version));
    }
    println!(
        "\n{} Deleted {} of {} versions of '{}'",
        style("✓").green(),
        deleted.len(),
        total,
        package
    );
}

/// Display any cleanup outcome in human-readable form.
pub fn display_outcome(outcome: &CleanupOutcome) {
    for notice in outcome.notices() {
        display_notice(&notice);
    }
    match outcome {
        CleanupOutcome::NoReleases { .. } => {}
        CleanupOutcome::Preview { package, plan } => display_plan(package, plan),
        CleanupOutcome::Live {
            package,
            total,
            deleted,
        } => display_summary(package, *total, deleted),
    }
}
