use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub backend: BackendConfig,

    pub tmdb: TmdbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

/// Connection settings for the hosted document store.
///
/// Empty strings mean "not configured".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: String,

    pub project_id: String,

    pub database_id: String,

    pub collection_id: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

impl BackendConfig {
    /// Names of the required values that are empty, in declaration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("endpoint", &self.endpoint),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("collection_id", &self.collection_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Returns true when all four values are present, logging the missing
    /// ones otherwise.
    pub fn validate(&self) -> bool {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return true;
        }

        warn!(missing = ?missing, "Backend configuration incomplete");
        false
    }

    /// Enough to construct a client handle.
    #[must_use]
    pub fn has_client(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    /// Enough to address the search collection.
    #[must_use]
    pub fn has_collection(&self) -> bool {
        !self.database_id.trim().is_empty() && !self.collection_id.trim().is_empty()
    }

    /// Subset of [`Self::missing_fields`] needed to address the collection.
    #[must_use]
    pub fn missing_collection_fields(&self) -> Vec<&'static str> {
        self.missing_fields()
            .into_iter()
            .filter(|name| matches!(*name, "database_id" | "collection_id"))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,

    /// API read access token, sent as a bearer token.
    pub api_key: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

pub mod env {
    pub const ENDPOINT: &str = "CINETREND_ENDPOINT";
    pub const PROJECT_ID: &str = "CINETREND_PROJECT_ID";
    pub const DATABASE_ID: &str = "CINETREND_DATABASE_ID";
    pub const COLLECTION_ID: &str = "CINETREND_COLLECTION_ID";
    pub const TMDB_API_KEY: &str = "CINETREND_TMDB_API_KEY";
}

impl Config {
    /// Loads the first config file found (or defaults), then applies
    /// environment overrides. A `.env` file is honoured if present.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with non-empty values from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (env::ENDPOINT, &mut self.backend.endpoint),
            (env::PROJECT_ID, &mut self.backend.project_id),
            (env::DATABASE_ID, &mut self.backend.database_id),
            (env::COLLECTION_ID, &mut self.backend.collection_id),
            (env::TMDB_API_KEY, &mut self.tmdb.api_key),
        ];

        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cinetrend").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cinetrend").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Rejects settings that cannot work at all. Missing backend values are
    /// not an error here; they disable tracking instead.
    pub fn validate(&self) -> Result<()> {
        if self.general.log_level.trim().is_empty() {
            anyhow::bail!("general.log_level cannot be empty");
        }

        if !self.backend.endpoint.trim().is_empty() {
            url::Url::parse(&self.backend.endpoint).with_context(|| {
                format!("Invalid backend endpoint: {}", self.backend.endpoint)
            })?;
        }

        url::Url::parse(&self.tmdb.base_url)
            .with_context(|| format!("Invalid TMDB base URL: {}", self.tmdb.base_url))?;

        if self.backend.request_timeout_seconds == 0 {
            anyhow::bail!("backend.request_timeout_seconds must be at least 1");
        }

        if self.tmdb.request_timeout_seconds == 0 {
            anyhow::bail!("tmdb.request_timeout_seconds must be at least 1");
        }

        Ok(())
    }
}
