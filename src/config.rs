//! Configuration for the server and the command-line client.
//!
//! The server reads its settings from the environment:
//! - `TRACKBOARD_DB` - Database file (default: platform data dir)
//! - `TRACKBOARD_CORS_ORIGINS` - Comma-separated allowed origins, `*` for any
//!
//! The command-line client keeps a small JSON file in the user config dir.
//! `TRACKBOARD_URL` overrides the API URL stored there.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_AUTHOR;

const APP_NAME: &str = "trackboard";
const CONFIG_FILE: &str = "config.json";

/// Default API base URL for local use.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default port for `trackboard serve`.
pub const DEFAULT_PORT: u16 = 8000;

const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Database file. `None` means the platform default.
    pub db_path: Option<PathBuf>,
    /// Allowed CORS origins. An entry of `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("TRACKBOARD_DB").ok(),
            std::env::var("TRACKBOARD_CORS_ORIGINS").ok(),
        )
    }

    fn from_vars(db: Option<String>, cors: Option<String>) -> Self {
        let db_path = db.filter(|s| !s.trim().is_empty()).map(PathBuf::from);

        let cors_origins = match cors {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            db_path,
            cors_origins,
        }
    }

    /// Whether any origin is allowed.
    pub fn cors_permissive(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}

/// Settings for the command-line client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    pub api_url: String,
    /// Name recorded on comments posted from the CLI.
    pub author_name: String,
    /// Per-request timeout. A request that runs longer counts as failed.
    pub request_timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            author_name: DEFAULT_AUTHOR.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl CliConfig {
    /// Load configuration from the user's config directory, then apply
    /// `TRACKBOARD_URL`. Returns defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let mut config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };

        if let Ok(url) = std::env::var("TRACKBOARD_URL") {
            config.api_url = url;
        }
        config
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config file")
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert!(config.db_path.is_none());
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
        assert!(!config.cors_permissive());
    }

    #[test]
    fn test_server_vars_are_parsed() {
        let config = ServerConfig::from_vars(
            Some("/tmp/board.db".to_string()),
            Some(" https://a.example , ,https://b.example".to_string()),
        );
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/board.db")));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_wildcard_origin_is_permissive() {
        let config = ServerConfig::from_vars(None, Some("*".to_string()));
        assert!(config.cors_permissive());
    }

    #[test]
    fn test_cli_config_fills_missing_fields() {
        let config = CliConfig::parse(r#"{"author_name": "Dana"}"#).unwrap();
        assert_eq!(config.author_name, "Dana");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cli_config_rejects_garbage() {
        assert!(CliConfig::parse("not json").is_err());
    }
}
