//! Retention policy for pre-release builds
//!
//! Decides which published versions are safe to delete:
//! - a line with a final release loses all of its dev and rc builds
//! - a line that is still unreleased keeps every rc; its dev builds are
//!   superseded once an rc exists, otherwise only the newest
//!   `keep_nightlies` dev builds survive
//! - post releases are never touched
//!
//! A plan that would remove every known version is refused outright.

use crate::domain::release::{classify, ReleaseDescriptor, ReleaseKind, ReleaseLine};
use crate::error::{CleanupError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Versions selected for deletion, in publication order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    versions: Vec<String>,
    total: usize,
}

impl DeletionPlan {
    /// Versions to delete, oldest first
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// Number of versions the plan was computed from
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Planned versions as an unordered set
    pub fn version_set(&self) -> BTreeSet<String> {
        self.versions.iter().cloned().collect()
    }
}

/// Compute the deletion plan for a package.
///
/// # Arguments
/// * `all_versions` - Every version currently published for the package
/// * `keep_nightlies` - How many of the newest dev builds an unreleased line keeps
///
/// # Returns
/// * `Ok(DeletionPlan)` - Strictly fewer versions than were supplied (or none)
/// * `Err(CleanupError::Format)` - If any version cannot be classified
/// * `Err(CleanupError::Safety)` - If the plan would delete every version
pub fn plan<I, S>(all_versions: I, keep_nightlies: usize) -> Result<DeletionPlan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = all_versions
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect();
    let total = unique.len();

    let mut lines: BTreeMap<ReleaseLine, Vec<ReleaseDescriptor>> = BTreeMap::new();
    for version in &unique {
        let descriptor = classify(version)?;
        lines.entry(descriptor.line).or_default().push(descriptor);
    }

    let mut marked: Vec<ReleaseDescriptor> = Vec::new();
    for (line, group) in lines {
        let before = marked.len();
        marked.extend(mark_line(group, keep_nightlies));
        tracing::debug!(
            "Release line {}: {} version(s) marked for deletion",
            line,
            marked.len() - before
        );
    }

    if !marked.is_empty() && marked.len() == total {
        return Err(CleanupError::safety(format!(
            "refusing to delete all {} versions of the package",
            total
        )));
    }

    marked.sort_by_key(ReleaseDescriptor::precedence);
    Ok(DeletionPlan {
        versions: marked.into_iter().map(|d| d.identifier).collect(),
        total,
    })
}

fn mark_line(group: Vec<ReleaseDescriptor>, keep_nightlies: usize) -> Vec<ReleaseDescriptor> {
    let has_final = group.iter().any(|d| d.kind == ReleaseKind::Final);
    let has_rc = group.iter().any(|d| d.kind == ReleaseKind::Rc);

    if has_final {
        return group
            .into_iter()
            .filter(|d| d.kind.is_prerelease())
            .collect();
    }

    let mut devs: Vec<ReleaseDescriptor> = group
        .into_iter()
        .filter(|d| d.kind == ReleaseKind::Dev)
        .collect();

    if has_rc {
        return devs;
    }

    devs.sort_by_key(|d| d.sequence);
    let excess = devs.len().saturating_sub(keep_nightlies);
    devs.truncate(excess);
    devs
}

/// Final check before a destructive call: only dev and rc builds may go.
pub fn ensure_deletable(version: &str) -> Result<ReleaseDescriptor> {
    let descriptor = classify(version)?;
    if !descriptor.kind.is_prerelease() {
        return Err(CleanupError::safety(format!(
            "Refusing to delete non-[dev|rc] version '{}'",
            version
        )));
    }
    Ok(descriptor)
}
