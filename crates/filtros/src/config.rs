//! Configuration loading from environment variables.

use std::time::Duration;

use crate::debounce::DEFAULT_QUIET_WINDOW;
use crate::error::{FilterError, Result};

pub const DEBOUNCE_VAR: &str = "FILTROS_DEBOUNCE_MS";
pub const BASE_PATH_VAR: &str = "FILTROS_BASE_PATH";

/// Synchronizer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Quiet window for the student search box
    pub debounce: Duration,

    /// Path navigations are built against. Empty keeps the current path.
    pub base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_QUIET_WINDOW,
            base_path: String::new(),
        }
    }
}

impl Config {
    /// Load settings from the environment.
    ///
    /// Reads `FILTROS_DEBOUNCE_MS` and `FILTROS_BASE_PATH`, either from the
    /// environment or from a `.env` file. Unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(
            std::env::var(DEBOUNCE_VAR).ok().as_deref(),
            std::env::var(BASE_PATH_VAR).ok().as_deref(),
        )
    }

    fn from_vars(debounce_ms: Option<&str>, base_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = debounce_ms {
            let ms: u64 = raw.trim().parse().map_err(|_| FilterError::InvalidConfig {
                name: DEBOUNCE_VAR,
                value: raw.to_string(),
            })?;
            config.debounce = Duration::from_millis(ms);
        }

        if let Some(path) = base_path {
            config.base_path = path.trim().to_string();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(None, None).unwrap();
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.base_path, "");
    }

    #[test]
    fn test_custom_values() {
        let config = Config::from_vars(Some("250"), Some(" /alertas/ ")).unwrap();
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.base_path, "/alertas/");
    }

    #[test]
    fn test_invalid_debounce() {
        let err = Config::from_vars(Some("meio segundo"), None).unwrap_err();
        assert!(err.to_string().contains(DEBOUNCE_VAR));
    }

    #[test]
    fn test_from_env_reads_variables() {
        std::env::set_var(DEBOUNCE_VAR, "300");
        std::env::set_var(BASE_PATH_VAR, "/ocorrencias/");

        let config = Config::from_env().unwrap();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.base_path, "/ocorrencias/");

        std::env::remove_var(DEBOUNCE_VAR);
        std::env::remove_var(BASE_PATH_VAR);
    }
}
