//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `base_url` is not an http(s) URL or `user_agent` is empty
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `retries` exceeds 5 or `retry_delay_ms` exceeds 10s
    /// - `cache_ttl_secs` is 0
    /// - any sample bound is 0
    /// - `history_query` is blank
    /// - the movement table or default movement is inconsistent
    ///
    /// A `target_count` above `max_attempts` is allowed but logged as a
    /// warning, since such samples always come up short.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("base_url", "must start with http:// or https://"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.retries > 5 {
            return Err(invalid("retries", "must not exceed 5"));
        }
        if self.retry_delay_ms > 10_000 {
            return Err(invalid("retry_delay_ms", "must not exceed 10000ms"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        for (field, value) in [
            ("target_count", self.target_count),
            ("max_attempts", self.max_attempts),
            ("search_window", self.search_window),
            ("highlights_target", self.highlights_target),
            ("highlights_max_attempts", self.highlights_max_attempts),
            ("history_target", self.history_target),
            ("history_window", self.history_window),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        if self.history_query.trim().is_empty() {
            return Err(invalid("history_query", "must not be blank"));
        }

        if self.target_count > self.max_attempts {
            tracing::warn!(
                target_count = self.target_count,
                max_attempts = self.max_attempts,
                "target_count exceeds max_attempts; samples will always come up short"
            );
        }

        self.catalog()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Movement;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let config = AppConfig { base_url: "collectionapi.metmuseum.org".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "base_url"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_too_many_retries() {
        let config = AppConfig { retries: 6, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retries"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_zero_budget() {
        let config = AppConfig { max_attempts: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_attempts"));
    }

    #[test]
    fn test_validate_target_above_budget_only_warns() {
        let config = AppConfig { target_count: 30, max_attempts: 10, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_blank_history_query() {
        let config = AppConfig { history_query: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "history_query"));
    }

    #[test]
    fn test_validate_zero_history_window() {
        let config = AppConfig { history_window: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "history_window"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_unknown_default_movement() {
        let config = AppConfig { default_movement: "cubism".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "default_movement"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            retries: 0,
            retry_delay_ms: 0,
            target_count: 1,
            max_attempts: 1,
            search_window: 1,
            movements: vec![Movement::new("renaissance", "Renaissance", &[11], "")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
