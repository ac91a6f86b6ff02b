//! Runtime settings from the environment (and an optional `.env`).

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::error::AppError;

pub const DEFAULT_TREASURY_BASE_URL: &str = "https://api.fiscaldata.treasury.gov/services/api/fiscal_service";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Only the `fred` command needs this.
    pub fred_api_key: Option<String>,
    pub treasury_base_url: String,
    /// `None` when no cache location could be determined.
    pub cache_dir: Option<PathBuf>,
    pub cache_enabled: bool,
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in practice).
    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout_secs = match non_empty("FINAGG_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::config(format!("FINAGG_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'."))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let cache_disabled = non_empty("FINAGG_NO_CACHE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cache_dir = non_empty("FINAGG_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(default_cache_dir);

        Ok(Self {
            fred_api_key: non_empty("FRED_API_KEY"),
            treasury_base_url: non_empty("TREASURY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TREASURY_BASE_URL.to_string()),
            cache_dir,
            cache_enabled: !cache_disabled,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    pub fn require_fred_key(&self) -> Result<&str, AppError> {
        self.fred_api_key
            .as_deref()
            .ok_or_else(|| AppError::config("Missing FRED_API_KEY in environment (.env)."))
    }
}

/// Platform cache directory, e.g. `~/.cache/finagg` on Linux.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "finagg").map(|dirs| dirs.cache_dir().to_path_buf())
}
