//! Platform connection configuration.
//!
//! Provides the configuration structure and its layered loading.

use aiplatform_abstraction::{ConnectionContext, Credentials, DEFAULT_LOCATION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PROJECT: &str = "AIPLATFORM_PROJECT";
pub const ENV_LOCATION: &str = "AIPLATFORM_LOCATION";
pub const ENV_ENDPOINT: &str = "AIPLATFORM_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "AIPLATFORM_ACCESS_TOKEN";

/// Default request timeout for HTTP clients.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings shared by the clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Default project for bare resource ids
    #[serde(default)]
    pub project: Option<String>,

    /// Default location (region) for bare resource ids
    #[serde(default)]
    pub location: Option<String>,

    /// API endpoint override; regional endpoints are used when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl PlatformConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".aiplatform")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".aiplatformrc")
    }

    /// Discover and load configuration.
    ///
    /// Precedence, highest first:
    /// 1. Environment variables (`AIPLATFORM_*`)
    /// 2. Local config (./.aiplatformrc)
    /// 3. Global config (~/.aiplatform/config.toml)
    pub fn discover_and_load() -> ConfigResult<Self> {
        let mut config =
            Self::load_layers(&Self::default_global_path(), &Self::default_local_path())?;
        config.merge(&Self::from_env_with(|key| std::env::var(key).ok()));
        Ok(config)
    }

    /// Load the global then the local file. Missing files are skipped; a file
    /// that exists but does not parse is an error.
    pub fn load_layers(global: &Path, local: &Path) -> ConfigResult<Self> {
        let mut config = Self::default();
        for path in [global, local] {
            match Self::load_from_file(path) {
                Ok(layer) => config.merge(&layer),
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(config)
    }

    /// Build a layer from environment-style lookups.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            project: read(ENV_PROJECT),
            location: read(ENV_LOCATION),
            endpoint: read(ENV_ENDPOINT),
            access_token: read(ENV_ACCESS_TOKEN),
            timeout_secs: None,
            log_level: None,
        }
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref project) = other.project {
            self.project = Some(project.clone());
        }
        if let Some(ref location) = other.location {
            self.location = Some(location.clone());
        }
        if let Some(ref endpoint) = other.endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        if let Some(ref access_token) = other.access_token {
            self.access_token = Some(access_token.clone());
        }
        if let Some(timeout_secs) = other.timeout_secs {
            self.timeout_secs = Some(timeout_secs);
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
    }

    #[must_use]
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    #[must_use]
    pub fn timeout_secs_or_default(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Context forwarded to remote calls.
    #[must_use]
    pub fn connection_context(&self) -> ConnectionContext {
        ConnectionContext {
            project: self.project.clone(),
            location: Some(self.location_or_default().to_string()),
            credentials: self.access_token.clone().map(Credentials::bearer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "project = \"p1\"\nlocation = \"europe-west4\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = PlatformConfig::load_from_file(&path).unwrap();
        assert_eq!(config.project.as_deref(), Some("p1"));
        assert_eq!(config.location.as_deref(), Some("europe-west4"));
        assert_eq!(config.timeout_secs_or_default(), 5);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = PlatformConfig::load_from_file(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_local_layer_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join("local.toml");
        std::fs::write(&global, "project = \"global\"\nlocation = \"asia-east1\"\n").unwrap();
        std::fs::write(&local, "project = \"local\"\n").unwrap();

        let config = PlatformConfig::load_layers(&global, &local).unwrap();
        assert_eq!(config.project.as_deref(), Some("local"));
        assert_eq!(config.location.as_deref(), Some("asia-east1"));
    }

    #[test]
    fn test_log_level_from_local_layer() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join("local.toml");
        std::fs::write(&global, "log_level = \"error\"\n").unwrap();
        std::fs::write(&local, "log_level = \"debug\"\n").unwrap();

        let mut config = PlatformConfig::load_layers(&global, &local).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        config.merge(&PlatformConfig::default());
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unparseable_layer_is_an_error() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        std::fs::write(&global, "project = [").unwrap();

        let result = PlatformConfig::load_layers(&global, &temp.path().join("missing"));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_layer_ignores_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_PROJECT, "env-project"),
            (ENV_LOCATION, "  "),
            (ENV_ACCESS_TOKEN, "tok"),
        ]);
        let layer = PlatformConfig::from_env_with(|key| env.get(key).map(|v| (*v).to_string()));

        let mut config = PlatformConfig {
            location: Some("us-east1".to_string()),
            ..Default::default()
        };
        config.merge(&layer);
        assert_eq!(config.project.as_deref(), Some("env-project"));
        assert_eq!(config.location.as_deref(), Some("us-east1"));
        assert_eq!(config.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_connection_context_defaults_location() {
        let config = PlatformConfig {
            project: Some("p".to_string()),
            ..Default::default()
        };
        let ctx = config.connection_context();
        assert_eq!(ctx.project.as_deref(), Some("p"));
        assert_eq!(ctx.location.as_deref(), Some(DEFAULT_LOCATION));
        assert!(ctx.credentials.is_none());
    }
}
