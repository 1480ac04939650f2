use crate::error::{CleanupError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pypi-cleanup.toml";
/// File name looked up in the user configuration directory
pub const USER_CONFIG_FILE: &str = ".pypi-cleanup.toml";
/// Largest accepted `http.retry.backoff_factor`, in seconds
pub const MAX_BACKOFF_FACTOR: f64 = 60.0;

/// Represents the complete configuration for pypi-cleanup.
///
/// Contains the package to clean up, the retention default, the index hosts and HTTP behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_package")]
    pub package: String,

    #[serde(default = "default_keep_nightlies")]
    pub keep_nightlies: usize,

    #[serde(default)]
    pub indexes: IndexesConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

fn default_package() -> String {
    "duckdb".to_string()
}

fn default_keep_nightlies() -> usize {
    2
}

/// Base URLs of the production and test package indexes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndexesConfig {
    #[serde(default = "default_prod_index")]
    pub prod: String,

    #[serde(default = "default_test_index")]
    pub test: String,
}

fn default_prod_index() -> String {
    "https://pypi.org".to_string()
}

fn default_test_index() -> String {
    "https://test.pypi.org".to_string()
}

impl Default for IndexesConfig {
    fn default() -> Self {
        IndexesConfig {
            prod: default_prod_index(),
            test: default_test_index(),
        }
    }
}

/// HTTP session settings applied to every call against the index.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// Automatic retry settings.
///
/// The delay before retry `n` (1-based) is `backoff_factor * 2^(n-1)` seconds.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    0.5
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: default_max_attempts(),
            backoff_factor: default_backoff_factor(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            package: default_package(),
            keep_nightlies: default_keep_nightlies(),
            indexes: IndexesConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Reject settings that would make the session misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.package.trim().is_empty() {
            return Err(CleanupError::config("package name cannot be empty"));
        }
        if self.http.retry.max_attempts == 0 {
            return Err(CleanupError::config(
                "http.retry.max_attempts must be at least 1",
            ));
        }
        let backoff = self.http.retry.backoff_factor;
        if !backoff.is_finite() || !(0.0..=MAX_BACKOFF_FACTOR).contains(&backoff) {
            return Err(CleanupError::config(format!(
                "http.retry.backoff_factor must be between 0 and {} seconds",
                MAX_BACKOFF_FACTOR
            )));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(CleanupError::config(
                "http.request_timeout_secs must be at least 1",
            ));
        }
        validate_index_url("indexes.prod", &self.indexes.prod)?;
        validate_index_url("indexes.test", &self.indexes.test)?;
        Ok(())
    }
}

/// Index URLs must name the host root: request paths such as
/// `/account/login/` are resolved against it and would drop any path prefix.
fn validate_index_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| CleanupError::config(format!("{} is not a valid URL '{}': {}", key, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CleanupError::config(format!(
            "{} must be an http or https URL, got '{}'",
            key, value
        )));
    }
    if url.path() != "/" || url.query().is_some() {
        return Err(CleanupError::config(format!(
            "{} must be the root of the index host (no path), got '{}'",
            key, value
        )));
    }
    Ok(())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pypi-cleanup.toml` in current directory
/// 3. `.pypi-cleanup.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| CleanupError::config(format!("cannot read '{}': {}", path, e)))?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| CleanupError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
