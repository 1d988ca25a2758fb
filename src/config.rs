use crate::constants::*;
use crate::error::{MonitorError, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Settings as they appear in an optional TOML file. Every field is optional;
/// environment variables are layered on top before validation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub system_name: Option<String>,
    pub monitored_url: Option<String>,
    pub search_token: Option<String>,
    pub search_url: Option<String>,
    pub metrics_store_url: Option<String>,
    pub port: Option<u16>,
    pub timeout_on_search_secs: Option<u64>,
    pub time_to_failure_secs: Option<u64>,
    pub dry_run: Option<bool>,
    pub app_log_interval_ms: Option<u64>,
    pub http_log_interval_ms: Option<u64>,
    pub watch_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub metrics_addr: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from an environment lookup. Empty values count as unset.
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SYSTEM_NAME) {
            self.system_name = Some(v);
        }
        if let Some(v) = get(ENV_MONITORED_URL) {
            self.monitored_url = Some(v);
        }
        if let Some(v) = get(ENV_SEARCH_TOKEN) {
            self.search_token = Some(v);
        }
        if let Some(v) = get(ENV_SEARCH_URL) {
            self.search_url = Some(v);
        }
        if let Some(v) = get(ENV_METRICS_STORE_URL) {
            self.metrics_store_url = Some(v);
        }
        if let Some(v) = get(ENV_PORT) {
            self.port = Some(parse_var(ENV_PORT, &v)?);
        }
        if let Some(v) = get(ENV_TIMEOUT_ON_SEARCH) {
            self.timeout_on_search_secs = Some(parse_var(ENV_TIMEOUT_ON_SEARCH, &v)?);
        }
        if let Some(v) = get(ENV_TIME_TO_FAILURE) {
            self.time_to_failure_secs = Some(parse_var(ENV_TIME_TO_FAILURE, &v)?);
        }
        if let Some(v) = get(ENV_DRY_RUN) {
            self.dry_run = Some(is_truthy(&v));
        }
        if let Some(v) = get(ENV_APP_LOG_INTERVAL_MS) {
            self.app_log_interval_ms = Some(parse_var(ENV_APP_LOG_INTERVAL_MS, &v)?);
        }
        if let Some(v) = get(ENV_HTTP_LOG_INTERVAL_MS) {
            self.http_log_interval_ms = Some(parse_var(ENV_HTTP_LOG_INTERVAL_MS, &v)?);
        }
        if let Some(v) = get(ENV_WATCH_INTERVAL_MS) {
            self.watch_interval_ms = Some(parse_var(ENV_WATCH_INTERVAL_MS, &v)?);
        }
        if let Some(v) = get(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = Some(parse_var(ENV_REQUEST_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = get(ENV_METRICS_ADDR) {
            self.metrics_addr = Some(v);
        }
        Ok(self)
    }

    /// Validate and fill defaults.
    pub fn finish(self) -> Result<Config> {
        let dry_run = self.dry_run.unwrap_or(false);
        let system_name = required(self.system_name, ENV_SYSTEM_NAME, "The system name was not found")?;
        let monitored_url = required(self.monitored_url, ENV_MONITORED_URL, "No URL was provided")?;
        let search_token = required(self.search_token, ENV_SEARCH_TOKEN, "The search token was not found")?;
        let metrics_store_url = match self.metrics_store_url {
            Some(url) => Some(url.trim_end_matches('/').to_string()),
            None if dry_run => None,
            None => {
                return Err(MonitorError::Config(format!(
                    "The metric store URL was not found ({ENV_METRICS_STORE_URL})"
                )))
            }
        };
        let metrics_addr = self
            .metrics_addr
            .map(|a| parse_var::<SocketAddr>(ENV_METRICS_ADDR, &a))
            .transpose()?;

        let app_log_interval_ms = positive(
            ENV_APP_LOG_INTERVAL_MS,
            self.app_log_interval_ms.unwrap_or(DEFAULT_APP_LOG_INTERVAL_MS),
        )?;
        let http_log_interval_ms = positive(
            ENV_HTTP_LOG_INTERVAL_MS,
            self.http_log_interval_ms.unwrap_or(DEFAULT_HTTP_LOG_INTERVAL_MS),
        )?;
        let watch_interval_ms = positive(
            ENV_WATCH_INTERVAL_MS,
            self.watch_interval_ms.unwrap_or(DEFAULT_WATCH_INTERVAL_MS),
        )?;

        Ok(Config {
            system_name,
            monitored_url: monitored_url.trim_end_matches('/').to_string(),
            search_token,
            search_url: self
                .search_url
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            metrics_store_url,
            port: self.port.unwrap_or(DEFAULT_PORT),
            timeout_on_search_secs: self.timeout_on_search_secs.unwrap_or(DEFAULT_TIMEOUT_ON_SEARCH_SECS),
            time_to_failure_secs: self.time_to_failure_secs.unwrap_or(DEFAULT_TIME_TO_FAILURE_SECS),
            dry_run,
            app_log_interval: Duration::from_millis(app_log_interval_ms),
            http_log_interval: Duration::from_millis(http_log_interval_ms),
            watch_interval: Duration::from_millis(watch_interval_ms),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            metrics_addr,
        })
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub system_name: String,
    pub monitored_url: String,
    pub search_token: String,
    pub search_url: String,
    /// `None` only in dry-run mode.
    pub metrics_store_url: Option<String>,
    pub port: u16,
    pub timeout_on_search_secs: u64,
    pub time_to_failure_secs: u64,
    pub dry_run: bool,
    pub app_log_interval: Duration,
    pub http_log_interval: Duration,
    pub watch_interval: Duration,
    pub request_timeout: Duration,
    pub metrics_addr: Option<SocketAddr>,
}

fn required(value: Option<String>, var: &str, message: &str) -> Result<String> {
    value.ok_or_else(|| MonitorError::Config(format!("{message} ({var})")))
}

fn positive(var: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(MonitorError::Config(format!("{var} must be greater than zero")));
    }
    Ok(value)
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| MonitorError::Config(format!("Invalid value '{raw}' for {var}: {e}")))
}

fn is_truthy(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
}
