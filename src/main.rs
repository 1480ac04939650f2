use std::process::ExitCode;

use clap::Parser;

use pypi_cleanup::cli::{run_cli, CliArgs};
use pypi_cleanup::error::{CleanupError, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS};
use pypi_cleanup::{logging, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = logging::setup_logging(args.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let result = tokio::select! {
        result = run_cli(&args) => result,
        _ = tokio::signal::ctrl_c() => {
            ui::display_error("Interrupted");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(outcome) => match ui::render_outcome(&outcome, args.json) {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                ui::display_error(&format!("Failed to write output: {}", e));
                ExitCode::from(EXIT_FAILURE)
            }
        },
        Err(e) => {
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn report_error(error: &CleanupError) {
    if let CleanupError::PartialDeletion {
        deleted, failures, ..
    } = error
    {
        for version in deleted {
            ui::display_success(&format!("Deleted {}", version));
        }
        for (version, reason) in failures {
            ui::display_error(&format!("{}: {}", version, reason));
        }
    }
    ui::display_error(&error.to_string());
}
