//! Release identifier classification
//!
//! Parses published version identifiers such as `1.2.3`, `1.2.3.dev5`,
//! `1.2.3rc2` or `1.2.3.post1` into a [ReleaseDescriptor]: the release line
//! the build belongs to, what kind of build it is, and its sequence number.

use crate::error::{CleanupError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:(\.post|\.dev|\.?rc)([0-9]+))?$")
            .expect("release identifier pattern is valid")
    })
}

/// The (major, minor, patch) triple a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReleaseLine {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ReleaseLine {
    /// Create a new release line
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        ReleaseLine {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ReleaseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Kind of published build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    /// Shipped release, no qualifier
    Final,
    /// Follow-up correction to a shipped release
    Post,
    /// Release candidate
    Rc,
    /// Development snapshot
    Dev,
}

impl ReleaseKind {
    /// Whether builds of this kind may ever be removed from the index
    pub fn is_prerelease(self) -> bool {
        matches!(self, ReleaseKind::Rc | ReleaseKind::Dev)
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseKind::Final => write!(f, "final"),
            ReleaseKind::Post => write!(f, "post"),
            ReleaseKind::Rc => write!(f, "rc"),
            ReleaseKind::Dev => write!(f, "dev"),
        }
    }
}

/// Structured view of a single version identifier
///
/// # Examples
/// - "1.2.3" -> line 1.2.3, Final, sequence 0
/// - "1.2.3.dev5" -> line 1.2.3, Dev, sequence 5
/// - "1.2.3rc2" -> line 1.2.3, Rc, sequence 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDescriptor {
    /// The identifier exactly as published
    pub identifier: String,
    pub line: ReleaseLine,
    pub kind: ReleaseKind,
    /// Ordering within `kind`; always 0 for `Final`
    pub sequence: u64,
}

impl ReleaseDescriptor {
    /// Publication order within the index: line first, then dev < rc < final < post.
    pub fn precedence(&self) -> (ReleaseLine, u8, u64) {
        let rank = match self.kind {
            ReleaseKind::Dev => 0,
            ReleaseKind::Rc => 1,
            ReleaseKind::Final => 2,
            ReleaseKind::Post => 3,
        };
        (self.line, rank, self.sequence)
    }
}

impl FromStr for ReleaseDescriptor {
    type Err = CleanupError;

    fn from_str(s: &str) -> Result<Self> {
        classify(s)
    }
}

impl fmt::Display for ReleaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// Classify a version identifier.
///
/// Accepts exactly four shapes: `MAJOR.MINOR.PATCH`, `MAJOR.MINOR.PATCH.postN`,
/// `MAJOR.MINOR.PATCH.devN` and `MAJOR.MINOR.PATCHrcN` (the dot before `rc`
/// is optional). Anything else is a [CleanupError::Format].
///
/// # Examples
/// ```
/// use pypi_cleanup::domain::{classify, ReleaseKind, ReleaseLine};
///
/// let d = classify("1.0.1.dev21").unwrap();
/// assert_eq!(d.line, ReleaseLine::new(1, 0, 1));
/// assert_eq!(d.kind, ReleaseKind::Dev);
/// assert_eq!(d.sequence, 21);
/// assert!(classify("v1.0.1").is_err());
/// ```
pub fn classify(identifier: &str) -> Result<ReleaseDescriptor> {
    let caps = identifier_pattern().captures(identifier).ok_or_else(|| {
        CleanupError::format(
            identifier,
            "expected MAJOR.MINOR.PATCH with an optional .devN, rcN or .postN suffix",
        )
    })?;

    let component = |index: usize, name: &str| -> Result<u32> {
        caps[index].parse::<u32>().map_err(|_| {
            CleanupError::format(identifier, format!("{} component out of range", name))
        })
    };
    let line = ReleaseLine::new(
        component(1, "major")?,
        component(2, "minor")?,
        component(3, "patch")?,
    );

    let (kind, sequence) = match caps.get(4).map(|m| m.as_str()) {
        None => (ReleaseKind::Final, 0),
        Some(suffix) => {
            let kind = match suffix {
                ".post" => ReleaseKind::Post,
                ".dev" => ReleaseKind::Dev,
                _ => ReleaseKind::Rc,
            };
            let sequence = caps[5].parse::<u64>().map_err(|_| {
                CleanupError::format(identifier, "sequence number out of range")
            })?;
            (kind, sequence)
        }
    };

    Ok(ReleaseDescriptor {
        identifier: identifier.to_string(),
        line,
        kind,
        sequence,
    })
}
