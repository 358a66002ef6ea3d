use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::storage::StorageKeys;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub storage_keys: StorageKeys,
    pub user_agent: String,
}

/// Which set of storage keys a persisted session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProfile {
    #[default]
    Mobile,
    Web,
}

impl StorageProfile {
    pub fn keys(self) -> StorageKeys {
        match self {
            StorageProfile::Mobile => StorageKeys::mobile(),
            StorageProfile::Web => StorageKeys::web(),
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(StorageProfile::Mobile),
            "web" => Ok(StorageProfile::Web),
            other => Err(ApiError::Config(format!(
                "unknown storage profile '{}', expected 'mobile' or 'web'",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    api: ApiSection,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    base_url: String,
    #[serde(default)]
    timeout_seconds: Option<u64>,
    #[serde(default)]
    storage_profile: Option<StorageProfile>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_keys: StorageKeys::mobile(),
            user_agent: format!("onlycats-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_storage_keys(mut self, keys: StorageKeys) -> Self {
        self.storage_keys = keys;
        self
    }

    /// Reads `ONLYCATS_*` variables, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("ONLYCATS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = match env::var("ONLYCATS_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ApiError::Config(format!("ONLYCATS_TIMEOUT_SECS must be a number, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let profile = match env::var("ONLYCATS_STORAGE_PROFILE") {
            Ok(raw) => StorageProfile::parse(&raw)?,
            Err(_) => StorageProfile::default(),
        };

        Ok(Self::new(&base_url)?
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_storage_keys(profile.keys()))
    }

    /// Loads an `[api]` table from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ApiError::Config(e.to_string()))?;
        let api = file.api;
        Ok(Self::new(&api.base_url)?
            .with_timeout(Duration::from_secs(
                api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .with_storage_keys(api.storage_profile.unwrap_or_default().keys()))
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ApiError::Config(format!("invalid base URL '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ApiError::Config(format!(
            "base URL must use http or https, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slash() {
        let config = ClientConfig::new("https://api.onlycats.test/api/").unwrap();
        assert_eq!(config.base_url, "https://api.onlycats.test/api");
        assert_eq!(config.url("/pets/4"), "https://api.onlycats.test/api/pets/4");
        assert_eq!(config.url("auth/login"), "https://api.onlycats.test/api/auth/login");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ApiError::Config(_))
        ));
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn parses_toml_file() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "http://127.0.0.1:9000"
            timeout_seconds = 3
            storage_profile = "web"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.storage_keys, StorageKeys::web());
    }
}
