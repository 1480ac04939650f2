use std::fmt;

/// Conditions worth telling the operator about that do not fail the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunNotice {
    /// The index lists no releases for the package
    NoReleases { package: String },
    /// Every published version survives the retention policy
    NothingToDelete { package: String, total: usize },
    /// A live run will keep no dev builds on unreleased lines
    NoNightliesKept,
}

impl fmt::Display for RunNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunNotice::NoReleases { package } => {
                write!(f, "No releases found for package '{}'", package)
            }
            RunNotice::NothingToDelete { package, total } => {
                write!(
                    f,
                    "Nothing to delete: all {} versions of '{}' are retained",
                    total, package
                )
            }
            RunNotice::NoNightliesKept => {
                write!(
                    f,
                    "--max-nightlies is 0: every dev build of unreleased lines will be deleted"
                )
            }
        }
    }
}
