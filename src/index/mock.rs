use crate::credentials::Credentials;
use crate::domain::ensure_deletable;
use crate::error::{CleanupError, Result};
use crate::index::PackageIndex;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Calls recorded by [MockIndex], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Fetch,
    Authenticate { username: String },
    Delete { version: String },
}

#[derive(Debug, Default)]
struct MockState {
    versions: BTreeSet<String>,
    fetch_error: Option<String>,
    reject_credentials: bool,
    failing_deletes: BTreeSet<String>,
    authenticated: bool,
    calls: Vec<MockCall>,
    removed: Vec<String>,
}

/// In-memory package index for testing without network access
///
/// Clones share state, so a test can keep a handle while the workflow owns another.
#[derive(Debug, Clone)]
pub struct MockIndex {
    package: String,
    state: Arc<Mutex<MockState>>,
}

impl MockIndex {
    /// Create an index with no published versions
    pub fn new(package: impl Into<String>) -> Self {
        MockIndex {
            package: package.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Publish versions
    pub fn with_versions<I, S>(self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state()
            .versions
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Make the read API fail
    pub fn failing_fetch(self, reason: impl Into<String>) -> Self {
        self.state().fetch_error = Some(reason.into());
        self
    }

    /// Reject every login attempt
    pub fn rejecting_credentials(self) -> Self {
        self.state().reject_credentials = true;
        self
    }

    /// Make deleting `version` fail
    pub fn failing_delete(self, version: impl Into<String>) -> Self {
        self.state().failing_deletes.insert(version.into());
        self
    }

    /// Versions still published
    pub fn versions(&self) -> BTreeSet<String> {
        self.state().versions.clone()
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Versions removed so far, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.state().removed.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PackageIndex for MockIndex {
    fn package(&self) -> &str {
        &self.package
    }

    async fn fetch_released_versions(&self) -> Result<BTreeSet<String>> {
        let mut state = self.state();
        state.calls.push(MockCall::Fetch);
        match &state.fetch_error {
            Some(reason) => Err(CleanupError::index_unavailable(format!(
                "Failed to fetch package information for '{}': {}",
                self.package, reason
            ))),
            None => Ok(state.versions.clone()),
        }
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let mut state = self.state();
        state.calls.push(MockCall::Authenticate {
            username: credentials.username.clone(),
        });
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(CleanupError::authentication(
                "Username and password are required for authentication",
            ));
        }
        if state.reject_credentials {
            return Err(CleanupError::authentication(
                "the index rejected the username or password",
            ));
        }
        state.authenticated = true;
        Ok(())
    }

    async fn delete_version(&self, version: &str) -> Result<()> {
        ensure_deletable(version)?;

        let mut state = self.state();
        state.calls.push(MockCall::Delete {
            version: version.to_string(),
        });
        if !state.authenticated {
            return Err(CleanupError::authentication(
                "session must be authenticated before deleting",
            ));
        }
        if state.failing_deletes.contains(version) {
            return Err(CleanupError::delete(version, "HTTP 500 Internal Server Error"));
        }
        if !state.versions.remove(version) {
            return Err(CleanupError::delete(version, "HTTP 404 Not Found"));
        }
        state.removed.push(version.to_string());
        Ok(())
    }
}
