//! Remote store configuration
//!
//! Resolution order: `PLANSHIFT_API_URL` environment variable, then
//! `~/.planshift/config.toml`, then the built-in default.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::app;
use crate::paths;

/// Remote store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote store API (e.g. `http://localhost:8000/api/v1`)
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    app::DEFAULT_API_URL.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl RemoteConfig {
    /// Load configuration from the environment and config file
    pub fn load() -> Self {
        if let Ok(url) = std::env::var(app::API_URL_ENV) {
            if !url.trim().is_empty() {
                return Self {
                    api_url: url.trim().to_string(),
                };
            }
        }

        match std::fs::read_to_string(paths::config_file()) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Invalid config file, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_url() {
        let config = RemoteConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_config_file_round_trip() {
        let config = RemoteConfig {
            api_url: "http://example.com/api/v1".to_string(),
        };
        let text = toml::to_string(&config).expect("serialize config");
        let parsed: RemoteConfig = toml::from_str(&text).expect("parse config");
        assert_eq!(parsed.api_url, config.api_url);
    }

    #[test]
    fn test_missing_api_url_falls_back_to_default() {
        let parsed: RemoteConfig = toml::from_str("").expect("parse empty config");
        assert_eq!(parsed.api_url, "http://localhost:8000/api/v1");
    }
}
