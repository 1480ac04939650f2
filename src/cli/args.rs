use crate::config::Config;
use crate::credentials::validate_username;
use crate::error::{CleanupError, Result};
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "pypi-cleanup",
    version,
    about = "Remove stale dev and release-candidate builds from a package index"
)]
#[command(group(ArgGroup::new("host").required(true).args(["prod", "test"])))]
pub struct CliArgs {
    #[arg(long, help = "Clean up the production index")]
    pub prod: bool,

    #[arg(long, help = "Clean up the test index")]
    pub test: bool,

    #[arg(long, help = "Show what would be deleted without deleting anything")]
    pub dry_run: bool,

    #[arg(
        short = 'm',
        long,
        value_name = "N",
        help = "Dev builds to keep per unreleased line [default: 2]"
    )]
    pub max_nightlies: Option<usize>,

    #[arg(short, long, help = "Index account used for deletion")]
    pub username: Option<String>,

    #[arg(long, help = "Package to clean up (overrides the configuration file)")]
    pub package: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(long, help = "Print the result as JSON on stdout")]
    pub json: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl CliArgs {
    /// Base URL of the selected index.
    pub fn index_url<'a>(&self, config: &'a Config) -> &'a str {
        if self.prod {
            &config.indexes.prod
        } else {
            &config.indexes.test
        }
    }

    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(package) = &self.package {
            config.package = package.clone();
        }
        if let Some(keep) = self.max_nightlies {
            config.keep_nightlies = keep;
        }
    }
}

/// Check argument combinations clap cannot express.
///
/// Returns the validated username for live runs.
pub fn validate_arguments(args: &CliArgs) -> Result<Option<String>> {
    match (&args.username, args.dry_run) {
        (Some(raw), _) => validate_username(raw).map(Some),
        (None, true) => Ok(None),
        (None, false) => Err(CleanupError::validation(
            "username is required when not in dry-run mode",
        )),
    }
}
