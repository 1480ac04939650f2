//! HTTP session against a package index
//!
//! Anonymous reads use the JSON API. Destructive calls go through the web
//! management interface, which is protected by a login form, an optional
//! time-based second factor and per-form CSRF tokens.

use crate::config::HttpConfig;
use crate::credentials::Credentials;
use crate::domain::ensure_deletable;
use crate::error::{CleanupError, Result};
use crate::index::csrf::{CsrfExtractor, FormTokenParser, CSRF_FIELD};
use crate::index::retry::RetryPolicy;
use crate::index::PackageIndex;
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Path of the login form and its submission endpoint
pub const LOGIN_PATH: &str = "/account/login/";
/// Landing paths under this prefix are second-factor challenges
pub const TWO_FACTOR_PREFIX: &str = "/account/two-factor/";

#[derive(Debug, Deserialize)]
struct ProjectReleases {
    releases: BTreeMap<String, serde_json::Value>,
}

/// Authenticated-capable session for one package on one index
///
/// Owns the connection pool and cookie jar; dropping the session releases both.
pub struct IndexSession {
    client: Client,
    base_url: Url,
    package: String,
    retry: RetryPolicy,
    csrf: Box<dyn CsrfExtractor>,
    authenticated: bool,
}

impl IndexSession {
    /// Create a session for `package` on the index at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Index root, e.g. `https://test.pypi.org`
    /// * `package` - Project name on the index
    /// * `http` - Timeout and retry settings
    ///
    /// # Returns
    /// * `Ok(IndexSession)` - Ready for anonymous reads
    /// * `Err` - If the URL is invalid or the HTTP client cannot be built
    pub fn new(base_url: &str, package: impl Into<String>, http: &HttpConfig) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CleanupError::config(format!("invalid index URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(http.request_timeout())
            .user_agent(concat!("pypi-cleanup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(IndexSession {
            client,
            base_url,
            package: package.into(),
            retry: RetryPolicy::from_config(&http.retry),
            csrf: Box::new(FormTokenParser::new()),
            authenticated: false,
        })
    }

    /// Replace the HTML token extractor.
    pub fn with_csrf_extractor(mut self, extractor: Box<dyn CsrfExtractor>) -> Self {
        self.csrf = extractor;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CleanupError::config(format!("invalid index path '{}': {}", path, e)))
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let request = self.client.get(url).build()?;
        Ok(self.retry.execute(&self.client, request).await?)
    }

    async fn post_form(&self, url: Url, referer: &str, form: &[(&str, &str)]) -> Result<Response> {
        let request = self
            .client
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .build()?;
        Ok(self.retry.execute(&self.client, request).await?)
    }

    /// Fetch `path` and return the CSRF token of the form posting to it.
    async fn get_csrf_token(&self, path: &str) -> Result<Option<String>> {
        let response = self.get(self.endpoint(path)?).await?.error_for_status()?;
        let html = response.text().await?;
        Ok(self.csrf.extract(&html, path))
    }

    async fn complete_two_factor(&self, challenge: Response, otp: Option<&str>) -> Result<()> {
        let otp = otp.filter(|code| !code.is_empty()).ok_or_else(|| {
            CleanupError::authentication(
                "two-factor authentication required but no one-time code was supplied",
            )
        })?;

        let challenge_url = challenge.url().clone();
        let html = require_success(challenge, "two-factor page")?.text().await?;
        let action_with_query = match challenge_url.query() {
            Some(query) => format!("{}?{}", challenge_url.path(), query),
            None => challenge_url.path().to_string(),
        };
        let token = self
            .csrf
            .extract(&html, &action_with_query)
            .or_else(|| self.csrf.extract(&html, challenge_url.path()))
            .ok_or_else(|| {
                CleanupError::authentication("CSRF token not found on two-factor page")
            })?;

        tracing::debug!("Submitting one-time code to {}", challenge_url.path());
        let response = self
            .post_form(
                challenge_url.clone(),
                challenge_url.as_str(),
                &[
                    (CSRF_FIELD, token.as_str()),
                    ("method", "totp"),
                    ("totp_value", otp),
                ],
            )
            .await?;
        let response = require_success(response, "two-factor submission")?;

        if response.url().path().starts_with(TWO_FACTOR_PREFIX) {
            return Err(CleanupError::authentication(
                "two-factor code was rejected",
            ));
        }
        Ok(())
    }
}

/// A non-success status during the login handshake means the index refused us.
fn require_success(response: Response, step: &str) -> Result<Response> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(CleanupError::authentication(format!(
            "{} returned {}",
            step, status
        )));
    }
    Ok(response)
}

#[async_trait]
impl PackageIndex for IndexSession {
    fn package(&self) -> &str {
        &self.package
    }

    async fn fetch_released_versions(&self) -> Result<BTreeSet<String>> {
        let unavailable = |e: reqwest::Error| {
            CleanupError::index_unavailable(format!(
                "Failed to fetch package information for '{}': {}",
                self.package, e
            ))
        };

        let url = self.endpoint(&format!("/pypi/{}/json", self.package))?;
        tracing::debug!("Fetching releases from {}", url);
        let request = self.client.get(url).build()?;
        let response = self
            .retry
            .execute(&self.client, request)
            .await
            .and_then(Response::error_for_status)
            .map_err(unavailable)?;
        let info: ProjectReleases = response.json().await.map_err(unavailable)?;

        Ok(info.releases.into_keys().collect())
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(CleanupError::authentication(
                "Username and password are required for authentication",
            ));
        }

        let login_url = self.endpoint(LOGIN_PATH)?;
        let token = self.get_csrf_token(LOGIN_PATH).await?.ok_or_else(|| {
            CleanupError::authentication("CSRF token not found on login page")
        })?;

        tracing::debug!("Submitting credentials for {}", credentials.username);
        let response = self
            .post_form(
                login_url.clone(),
                login_url.as_str(),
                &[
                    (CSRF_FIELD, token.as_str()),
                    ("username", credentials.username.as_str()),
                    ("password", credentials.password.as_str()),
                ],
            )
            .await?;
        let response = require_success(response, "login")?;

        let landing = response.url().path().to_string();
        if landing.starts_with(TWO_FACTOR_PREFIX) {
            self.complete_two_factor(response, credentials.otp.as_deref())
                .await?;
        } else if landing == LOGIN_PATH {
            return Err(CleanupError::authentication(
                "the index rejected the username or password",
            ));
        }

        self.authenticated = true;
        tracing::info!("Authenticated as {}", credentials.username);
        Ok(())
    }

    async fn delete_version(&self, version: &str) -> Result<()> {
        ensure_deletable(version)?;
        if !self.authenticated {
            return Err(CleanupError::authentication(
                "session must be authenticated before deleting",
            ));
        }

        let action = format!("/manage/project/{}/release/{}/", self.package, version);
        let form_url = self.endpoint(&action)?;
        let failed = |reason: String| CleanupError::delete(version, reason);

        let token = self
            .get_csrf_token(&action)
            .await
            .map_err(|e| failed(e.to_string()))?
            .ok_or_else(|| failed("CSRF token not found on release page".to_string()))?;

        self.post_form(
            form_url.clone(),
            form_url.as_str(),
            &[("confirm_delete_version", version), (CSRF_FIELD, token.as_str())],
        )
        .await
        .map_err(|e| failed(e.to_string()))?
        .error_for_status()
        .map_err(|e| failed(e.to_string()))?;

        tracing::info!("Deleted {} {}", self.package, version);
        Ok(())
    }
}
