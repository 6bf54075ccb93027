use std::time::Duration;

use tracing::warn;

use crate::error::{PortfolioError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_SITE_URL: &str = "https://theopeningsign.vercel.app";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_VAR: &str = "NOTION_API_KEY";
const DATABASE_ID_VAR: &str = "NOTION_DATABASE_ID";

/// Settings for the content source. Required values stay optional here so a
/// missing credential only fails the first network call.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub api_base: String,
    pub notion_version: String,
    pub site_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Read settings from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty(API_KEY_VAR),
            database_id: non_empty(DATABASE_ID_VAR),
            api_base: non_empty("NOTION_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            notion_version: non_empty("NOTION_VERSION").unwrap_or(defaults.notion_version),
            site_url: non_empty("SITE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Startup check. Returns the names of missing required settings and
    /// logs a single warning when any are absent.
    pub fn check(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(API_KEY_VAR);
        }
        if self.database_id.is_none() {
            missing.push(DATABASE_ID_VAR);
        }
        if !missing.is_empty() {
            warn!(
                "Content source not configured (missing {}); requests will fail",
                missing.join(", ")
            );
        }
        missing
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(PortfolioError::MissingConfig(API_KEY_VAR))
    }

    pub fn database_id(&self) -> Result<&str> {
        self.database_id
            .as_deref()
            .ok_or(PortfolioError::MissingConfig(DATABASE_ID_VAR))
    }
}
