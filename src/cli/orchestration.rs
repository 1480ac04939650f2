//! Main cleanup workflow orchestration
//!
//! Runs the phases strictly in order, never re-entering one:
//! `Fetch -> Plan -> (Report | Authenticate -> Delete)`.
//! A preview stops after planning; a live run authenticates once and then
//! attempts every planned deletion before reporting failures in aggregate.

use crate::credentials::Credentials;
use crate::domain::{plan, DeletionPlan};
use crate::error::{CleanupError, Result};
use crate::index::PackageIndex;
use crate::notice::RunNotice;
use serde::Serialize;
use std::fmt;

/// Whether the run may mutate the index
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Compute and report the plan only
    Preview,
    /// Authenticate and delete the planned versions
    Live(Credentials),
}

/// Workflow phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetch,
    Plan,
    Report,
    Authenticate,
    Delete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fetch => "fetch",
            Phase::Plan => "plan",
            Phase::Report => "report",
            Phase::Authenticate => "authenticate",
            Phase::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Result of a successful cleanup run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// The index had no releases; nothing was planned
    NoReleases { package: String },
    /// Preview of what a live run would delete
    Preview {
        package: String,
        #[serde(flatten)]
        plan: DeletionPlan,
    },
    /// Live run in which every planned deletion succeeded
    Live {
        package: String,
        total: usize,
        deleted: Vec<String>,
    },
}

impl CleanupOutcome {
    pub fn package(&self) -> &str {
        match self {
            CleanupOutcome::NoReleases { package }
            | CleanupOutcome::Preview { package, .. }
            | CleanupOutcome::Live { package, .. } => package,
        }
    }

    /// Non-fatal conditions the operator should see
    pub fn notices(&self) -> Vec<RunNotice> {
        match self {
            CleanupOutcome::NoReleases { package } => vec![RunNotice::NoReleases {
                package: package.clone(),
            }],
            CleanupOutcome::Preview { package, plan } if plan.is_empty() => {
                vec![RunNotice::NothingToDelete {
                    package: package.clone(),
                    total: plan.total(),
                }]
            }
            CleanupOutcome::Live {
                package,
                total,
                deleted,
            } if deleted.is_empty() => vec![RunNotice::NothingToDelete {
                package: package.clone(),
                total: *total,
            }],
            _ => Vec::new(),
        }
    }
}

/// Drives one cleanup run against a package index
///
/// The orchestrator owns the index handle for the duration of [run](Self::run)
/// and drops it when the run ends, whatever the outcome.
pub struct CleanupOrchestrator<I: PackageIndex> {
    index: I,
    keep_nightlies: usize,
    mode: RunMode,
}

impl<I: PackageIndex> CleanupOrchestrator<I> {
    /// # Arguments
    /// * `index` - Index handle for the package to clean up
    /// * `keep_nightlies` - Dev builds an unreleased line keeps
    /// * `mode` - Preview, or live with the credentials to authenticate with
    pub fn new(index: I, keep_nightlies: usize, mode: RunMode) -> Self {
        CleanupOrchestrator {
            index,
            keep_nightlies,
            mode,
        }
    }

    /// Run the workflow to completion.
    ///
    /// # Returns
    /// * `Ok(CleanupOutcome)` - No releases, a preview, or a fully successful live run
    /// * `Err(CleanupError::PartialDeletion)` - Some deletions failed; the rest were attempted
    /// * `Err` - Any fetch, format, safety or authentication failure, before anything was deleted
    pub async fn run(self) -> Result<CleanupOutcome> {
        let CleanupOrchestrator {
            mut index,
            keep_nightlies,
            mode,
        } = self;
        let package = index.package().to_string();

        enter(Phase::Fetch, &package);
        let versions = index.fetch_released_versions().await?;
        if versions.is_empty() {
            tracing::info!("No releases found for {}", package);
            return Ok(CleanupOutcome::NoReleases { package });
        }
        tracing::info!("Found {} releases for {}", versions.len(), package);

        enter(Phase::Plan, &package);
        let plan = plan(&versions, keep_nightlies)?;
        tracing::info!(
            "{} of {} versions selected for deletion",
            plan.len(),
            plan.total()
        );

        let credentials = match mode {
            RunMode::Preview => {
                enter(Phase::Report, &package);
                return Ok(CleanupOutcome::Preview { package, plan });
            }
            RunMode::Live(credentials) => credentials,
        };

        if plan.is_empty() {
            tracing::info!("No versions to delete, skipping login");
            return Ok(CleanupOutcome::Live {
                package,
                total: plan.total(),
                deleted: Vec::new(),
            });
        }

        enter(Phase::Authenticate, &package);
        index.authenticate(&credentials).await?;

        enter(Phase::Delete, &package);
        let deleted = delete_all(&index, &plan).await?;

        Ok(CleanupOutcome::Live {
            package,
            total: plan.total(),
            deleted,
        })
    }
}

fn enter(phase: Phase, package: &str) {
    tracing::debug!("Entering {} phase for {}", phase, package);
}

/// Attempt every planned deletion, then fail if any of them failed.
async fn delete_all<I: PackageIndex>(index: &I, plan: &DeletionPlan) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    let mut failures = Vec::new();

    for version in plan.versions() {
        match index.delete_version(version).await {
            Ok(()) => deleted.push(version.clone()),
            Err(err) => {
                tracing::warn!("Failed to delete {}: {}", version, err);
                failures.push((version.clone(), err.to_string()));
            }
        }
    }

    if failures.is_empty() {
        return Ok(deleted);
    }

    let total = plan.len();
    tracing::error!("Failed to delete {}/{} versions", failures.len(), total);
    Err(CleanupError::PartialDeletion {
        failed: failures.len(),
        total,
        deleted,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Authenticate.to_string(), "authenticate");
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = CleanupOutcome::Preview {
            package: "demo".to_string(),
            plan: plan(["1.0.0", "1.0.0.dev1"], 2).unwrap(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mode"], "preview");
        assert_eq!(json["package"], "demo");
        assert_eq!(json["total"], 2);
        assert_eq!(json["versions"][0], "1.0.0.dev1");
    }

    #[test]
    fn test_notices_for_empty_preview() {
        let outcome = CleanupOutcome::Preview {
            package: "demo".to_string(),
            plan: plan(["1.0.0"], 2).unwrap(),
        };
        assert_eq!(
            outcome.notices(),
            vec![RunNotice::NothingToDelete {
                package: "demo".to_string(),
                total: 1
            }]
        );
    }
}
