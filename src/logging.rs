//! Logging setup for the command-line binary

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,pypi_cleanup=debug"
    } else {
        "warn,pypi_cleanup=info"
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn setup_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}
