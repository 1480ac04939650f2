//! Package index abstraction layer
//!
//! This module provides a trait-based abstraction over the package index,
//! allowing the cleanup workflow to run against the real index over HTTP or
//! against an in-memory fake for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [PackageIndex] trait. The concrete
//! implementations include:
//!
//! - [session::IndexSession]: talks to the index with `reqwest`, including
//!   the login form, the second factor and the release delete form
//! - [mock::MockIndex]: an in-memory index for testing
//!
//! HTML scraping lives in [csrf] and the automatic retry behavior in [retry],
//! both attached to the session at construction.

pub mod csrf;
pub mod mock;
pub mod retry;
pub mod session;

pub use csrf::{CsrfExtractor, FormTokenParser};
pub use mock::{MockCall, MockIndex};
pub use retry::RetryPolicy;
pub use session::IndexSession;

use crate::credentials::Credentials;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Operations the cleanup workflow needs from a package index
///
/// ## Error Handling
///
/// - `fetch_released_versions` reports [crate::error::CleanupError::IndexUnavailable]
///   when the read API does not answer successfully.
/// - `authenticate` reports [crate::error::CleanupError::Authentication] for
///   missing or rejected credentials.
/// - `delete_version` reports [crate::error::CleanupError::Safety] for any
///   version that is not a dev or rc build, before any network traffic, and
///   [crate::error::CleanupError::Delete] when the index refuses the deletion.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Name of the package this index handle operates on
    fn package(&self) -> &str;

    /// Every version currently published for the package
    async fn fetch_released_versions(&self) -> Result<BTreeSet<String>>;

    /// Log in so that destructive calls are accepted
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()>;

    /// Remove one published version
    async fn delete_version(&self, version: &str) -> Result<()>;
}
