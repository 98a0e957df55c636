//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CURIO_*)
//! 2. TOML config file (if CURIO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::artifact::SampleLimits;
use crate::catalog::{Catalog, DEFAULT_MOVEMENT, Movement, builtin_movements};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CURIO_*)
/// 2. TOML config file (if CURIO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via CURIO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the collection API.
    ///
    /// Set via CURIO_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CURIO_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in milliseconds.
    ///
    /// Set via CURIO_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a network or timeout failure.
    ///
    /// Set via CURIO_RETRIES environment variable.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between retry attempts in milliseconds.
    ///
    /// Set via CURIO_RETRY_DELAY_MS environment variable.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Lifetime of a cached sample in seconds.
    ///
    /// Set via CURIO_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Records per movement sample.
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Per-item fetch budget shared by the bucket and search phases.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Search hits considered by the fallback phase.
    #[serde(default = "default_search_window")]
    pub search_window: usize,

    /// Movement served for absent or unknown keys.
    ///
    /// Set via CURIO_DEFAULT_MOVEMENT environment variable.
    #[serde(default = "default_movement")]
    pub default_movement: String,

    /// Department sampled for the highlights reel.
    #[serde(default = "default_highlights_bucket")]
    pub highlights_bucket: u32,

    /// Records in the highlights reel.
    #[serde(default = "default_highlights_target")]
    pub highlights_target: usize,

    /// Fetch budget for the highlights reel.
    #[serde(default = "default_highlights_max_attempts")]
    pub highlights_max_attempts: usize,

    /// Search term behind the history reel.
    ///
    /// Set via CURIO_HISTORY_QUERY environment variable.
    #[serde(default = "default_history_query")]
    pub history_query: String,

    /// Records in the history reel.
    #[serde(default = "default_history_target")]
    pub history_target: usize,

    /// Leading search hits the history reel may fetch. Doubles as its budget.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Movement table. Only the TOML file can replace it.
    #[serde(default = "builtin_movements")]
    pub movements: Vec<Movement>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./curio-cache.sqlite")
}

fn default_base_url() -> String {
    "https://collectionapi.metmuseum.org/public/collection/v1".into()
}

fn default_user_agent() -> String {
    "curio/0.1".into()
}

fn default_timeout_ms() -> u64 {
    8_000
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    200
}

fn default_cache_ttl_secs() -> u64 {
    3_600
}

fn default_target_count() -> usize {
    20
}

fn default_max_attempts() -> usize {
    100
}

fn default_search_window() -> usize {
    50
}

fn default_movement() -> String {
    DEFAULT_MOVEMENT.into()
}

fn default_highlights_bucket() -> u32 {
    1
}

fn default_highlights_target() -> usize {
    12
}

fn default_highlights_max_attempts() -> usize {
    80
}

fn default_history_query() -> String {
    "ancient".into()
}

fn default_history_target() -> usize {
    12
}

fn default_history_window() -> usize {
    12
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            target_count: default_target_count(),
            max_attempts: default_max_attempts(),
            search_window: default_search_window(),
            default_movement: default_movement(),
            highlights_bucket: default_highlights_bucket(),
            highlights_target: default_highlights_target(),
            highlights_max_attempts: default_highlights_max_attempts(),
            history_query: default_history_query(),
            history_target: default_history_target(),
            history_window: default_history_window(),
            movements: builtin_movements(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Limits for movement samples.
    pub fn sample_limits(&self) -> SampleLimits {
        SampleLimits {
            target_count: self.target_count,
            max_attempts: self.max_attempts,
            search_window: self.search_window,
        }
    }

    /// Limits for the highlights reel. It never searches, so the window is moot.
    pub fn highlights_limits(&self) -> SampleLimits {
        SampleLimits {
            target_count: self.highlights_target,
            max_attempts: self.highlights_max_attempts,
            search_window: self.search_window,
        }
    }

    /// Pseudo-movement backing the highlights reel: one bucket, no fallback.
    pub fn highlights_movement(&self) -> Movement {
        Movement::new("highlights", "Highlights", &[self.highlights_bucket], "")
    }

    /// Limits for the history reel: only the first `history_window` hits are
    /// ever fetched.
    pub fn history_limits(&self) -> SampleLimits {
        SampleLimits {
            target_count: self.history_target,
            max_attempts: self.history_window,
            search_window: self.history_window,
        }
    }

    /// Pseudo-movement backing the history reel: no buckets, search only.
    pub fn history_movement(&self) -> Movement {
        Movement::new("history", "History", &[], &self.history_query)
    }

    /// Build the movement catalog from the configured table.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        Catalog::new(self.movements.clone(), &self.default_movement)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CURIO_`
    /// 2. TOML file from `CURIO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CURIO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CURIO_")
                .ignore(&["config_file", "movements"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
