//! Credentials for the authenticated deletion workflow
//!
//! The environment is read here and nowhere else; the rest of the crate
//! receives an explicit [Credentials] bundle.

use crate::error::{CleanupError, Result};
use regex::Regex;
use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Environment variable holding the account password
pub const PASSWORD_ENV: &str = "PYPI_CLEANUP_PASSWORD";
/// Environment variable holding the one-time code for the second factor
pub const OTP_ENV: &str = "PYPI_CLEANUP_OTP";

const MAX_USERNAME_LEN: usize = 100;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$")
            .expect("username pattern is valid")
    })
}

/// Secrets loaded from the environment for a live run.
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub password: String,
    pub otp: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("password", &"<redacted>")
            .field("otp", &"<redacted>")
            .finish()
    }
}

/// Username, password and one-time code for one authenticated run.
///
/// Held in memory only. `Debug` never prints the secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub otp: Option<String>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        otp: Option<String>,
    ) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
            otp,
        }
    }

    /// Combine a validated username with secrets from the environment.
    pub fn from_parts(username: impl Into<String>, secrets: Secrets) -> Self {
        Credentials::new(username, secrets.password, Some(secrets.otp))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("otp", &self.otp.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validate and normalize a username given on the command line.
///
/// Leading and trailing whitespace is stripped. The result must be at most
/// 100 characters, start and end with an alphanumeric character, and only
/// contain alphanumerics, `.`, `_` or `-`.
pub fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(CleanupError::validation("Username cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CleanupError::validation(format!(
            "Username too long (maximum {} characters)",
            MAX_USERNAME_LEN
        )));
    }
    if !username_pattern().is_match(username) {
        return Err(CleanupError::validation(format!(
            "Invalid username format: '{}'",
            username
        )));
    }
    Ok(username.to_string())
}

/// Load password and one-time code from the environment.
///
/// Dry runs never touch secrets and get `Ok(None)`.
pub fn load_secrets(dry_run: bool) -> Result<Option<Secrets>> {
    if dry_run {
        return Ok(None);
    }

    let password = required_env(PASSWORD_ENV)?;
    let otp = required_env(OTP_ENV)?;
    Ok(Some(Secrets { password, otp }))
}

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(CleanupError::validation(format!(
            "{} environment variable is required when not in dry-run mode",
            name
        ))),
    }
}
