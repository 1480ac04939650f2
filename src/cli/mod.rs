//! Command-line entry point glue
//!
//! - `args` - clap definitions and argument validation
//! - `orchestration` - the cleanup workflow itself

pub mod args;
pub mod orchestration;

pub use args::{validate_arguments, CliArgs};
pub use orchestration::{CleanupOrchestrator, CleanupOutcome, Phase, RunMode};

use crate::config::load_config;
use crate::credentials::{load_secrets, Credentials};
use crate::error::{CleanupError, Result};
use crate::index::IndexSession;
use crate::notice::RunNotice;
use crate::ui;

/// Run the cleanup described by parsed command-line arguments.
///
/// Loads configuration, validates arguments, reads secrets for live runs and
/// drives a [CleanupOrchestrator] over a fresh [IndexSession].
pub async fn run_cli(args: &CliArgs) -> Result<CleanupOutcome> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let username = validate_arguments(args)?;
    let mode = if args.dry_run {
        RunMode::Preview
    } else {
        let username = username.ok_or_else(|| {
            CleanupError::validation("username is required when not in dry-run mode")
        })?;
        let secrets = load_secrets(false)?.ok_or_else(|| {
            CleanupError::validation("password and one-time code are required in live mode")
        })?;
        if config.keep_nightlies == 0 {
            ui::display_notice(&RunNotice::NoNightliesKept);
        }
        RunMode::Live(Credentials::from_parts(username, secrets))
    };

    let index_url = args.index_url(&config);
    tracing::info!(
        "Cleaning up {} on {} ({})",
        config.package,
        index_url,
        if args.dry_run { "dry run" } else { "live" }
    );

    let session = IndexSession::new(index_url, config.package.clone(), &config.http)?;
    CleanupOrchestrator::new(session, config.keep_nightlies, mode)
        .run()
        .await
}
