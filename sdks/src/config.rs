// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// SDK Configuration
//
// Credentials and endpoint settings for the Eka Care client, loaded from:
// - an explicit path (--config)
// - EKACARE_CONFIG_PATH
// - ./ekacare-config.yaml
// - ~/.ekacare/config.yaml
// followed by EKACARE_* environment overrides.

use crate::error::{EkaCareError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.eka.care";
pub const CONFIG_PATH_ENV: &str = "EKACARE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Client ID issued in the developer console
    #[serde(default)]
    pub client_id: String,

    /// Client secret (supports "env:VAR_NAME" for environment variables)
    #[serde(default)]
    pub client_secret: String,

    /// Optional API key sent with login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between session status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up polling a session after this long
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_poll_timeout_secs() -> u64 {
    300
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl SdkConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EkaCareError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_yaml_str_with(yaml, |key| std::env::var(key).ok())
    }

    /// Parse YAML, resolving "env:VAR" references through `lookup`
    pub fn from_yaml_str_with<F>(yaml: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| EkaCareError::Config(format!("Failed to parse config YAML: {}", e)))?;
        config.client_secret = resolve_env_reference(&config.client_secret, &lookup);
        config.api_key = config
            .api_key
            .as_deref()
            .map(|key| resolve_env_reference(key, &lookup));
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| EkaCareError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Search the standard locations for a configuration file
    pub fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(
            |key| std::env::var(key).ok(),
            Path::new("."),
            dirs::home_dir().as_deref(),
        )
    }

    /// Discovery against an explicit environment, working directory and home
    pub fn discover_config_from<F>(lookup: F, cwd: &Path, home: Option<&Path>) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!("{} points to missing file: {:?}", CONFIG_PATH_ENV, path);
        }

        let local = cwd.join("ekacare-config.yaml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = home {
            let home_config = home.join(".ekacare").join("config.yaml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Load configuration with precedence: CLI path, discovery, defaults.
    /// Environment overrides are applied last in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from: {:?}", path);
            Self::from_yaml_file(&path)?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply EKACARE_* overrides from an arbitrary lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("EKACARE_CLIENT_ID") {
            tracing::debug!("Environment override: EKACARE_CLIENT_ID");
            self.client_id = val;
        }
        if let Some(val) = lookup("EKACARE_CLIENT_SECRET") {
            tracing::debug!("Environment override: EKACARE_CLIENT_SECRET");
            self.client_secret = val;
        }
        if let Some(val) = lookup("EKACARE_API_KEY") {
            tracing::debug!("Environment override: EKACARE_API_KEY");
            self.api_key = Some(val);
        }
        if let Some(val) = lookup("EKACARE_BASE_URL") {
            tracing::info!("Environment override: EKACARE_BASE_URL={}", val);
            self.base_url = val;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(EkaCareError::Config("client_id cannot be empty".into()));
        }

        if self.client_secret.trim().is_empty() {
            return Err(EkaCareError::Config("client_secret cannot be empty".into()));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EkaCareError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(EkaCareError::Config("timeout_secs must be positive".into()));
        }

        if self.poll_interval_secs == 0 || self.poll_interval_secs > self.poll_timeout_secs {
            return Err(EkaCareError::Config(
                "poll_interval_secs must be positive and not exceed poll_timeout_secs".into(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// Resolve "env:VAR_NAME" to the variable's value; anything else is returned as-is
fn resolve_env_reference<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match value.strip_prefix("env:") {
        Some(var) => lookup(var).unwrap_or_else(|| {
            tracing::warn!("Environment variable {} referenced in config is not set", var);
            String::new()
        }),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SdkConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_yaml_partial_document() {
        let config = SdkConfig::from_yaml_str(
            "client_id: my-client\nclient_secret: s3cret\npoll_timeout_secs: 60\n",
        )
        .unwrap();
        assert_eq!(config.client_id, "my-client");
        assert_eq!(config.client_secret, "s3cret");
        assert_eq!(config.poll_timeout_secs, 60);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ekacare-config.yaml");

        let mut config = SdkConfig::new("client", "secret");
        config.api_key = Some("key".to_string());
        config.to_yaml_file(&path).unwrap();

        let loaded = SdkConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);

        let explicit = SdkConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(explicit.base_url, config.base_url);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SdkConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, EkaCareError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let env = HashMap::from([
            ("EKACARE_CLIENT_ID", "from-env"),
            ("EKACARE_BASE_URL", "http://localhost:9000"),
        ]);
        let mut config = SdkConfig::new("from-file", "secret");
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.client_id, "from-env");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(config.api_key.is_none());
    }

    fn write_config(path: &Path, client_id: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("client_id: {}\nclient_secret: s\n", client_id)).unwrap();
    }

    #[test]
    fn test_discover_env_path_first() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().join("work");
        let home = dir.path().join("home");
        let explicit = dir.path().join("custom.yaml");
        write_config(&explicit, "explicit");
        write_config(&cwd.join("ekacare-config.yaml"), "local");
        write_config(&home.join(".ekacare").join("config.yaml"), "home");

        let env = HashMap::from([(CONFIG_PATH_ENV, explicit.to_string_lossy().to_string())]);
        let found =
            SdkConfig::discover_config_from(|key| env.get(key).cloned(), &cwd, Some(&home));
        assert_eq!(found, Some(explicit));
    }

    #[test]
    fn test_discover_missing_env_path_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().join("work");
        let home = dir.path().join("home");
        let home_config = home.join(".ekacare").join("config.yaml");
        write_config(&home_config, "home");
        std::fs::create_dir_all(&cwd).unwrap();

        let env = HashMap::from([(
            CONFIG_PATH_ENV,
            dir.path().join("gone.yaml").to_string_lossy().to_string(),
        )]);
        let lookup = |key: &str| env.get(key).cloned();

        assert_eq!(
            SdkConfig::discover_config_from(lookup, &cwd, Some(&home)),
            Some(home_config.clone())
        );

        let local = cwd.join("ekacare-config.yaml");
        write_config(&local, "local");
        assert_eq!(
            SdkConfig::discover_config_from(lookup, &cwd, Some(&home)),
            Some(local)
        );

        assert_eq!(
            SdkConfig::discover_config_from(|_| None, &dir.path().join("empty"), None),
            None
        );
    }

    #[test]
    fn test_env_secret_references() {
        let yaml = "client_id: c\nclient_secret: env:EKA_TEST_SECRET\napi_key: env:EKA_TEST_KEY\n";

        let env = HashMap::from([("EKA_TEST_SECRET", "from-env")]);
        let config =
            SdkConfig::from_yaml_str_with(yaml, |key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.client_secret, "from-env");
        // unset reference resolves to empty, which validation then rejects
        assert_eq!(config.api_key.as_deref(), Some(""));

        let unset = SdkConfig::from_yaml_str_with(yaml, |_| None).unwrap();
        assert_eq!(unset.client_secret, "");
        assert!(unset.validate().is_err());

        let literal = SdkConfig::from_yaml_str_with("client_secret: plain\n", |_| None).unwrap();
        assert_eq!(literal.client_secret, "plain");
    }

    #[test]
    fn test_validation() {
        let mut config = SdkConfig::new("client", "secret");
        assert!(config.validate().is_ok());

        config.client_id = "".to_string();
        assert!(config.validate().is_err());
        config.client_id = "client".to_string();

        config.client_secret = "  ".to_string();
        assert!(config.validate().is_err());
        config.client_secret = "secret".to_string();

        config.base_url = "ftp://api.eka.care".to_string();
        assert!(config.validate().is_err());
        config.base_url = DEFAULT_BASE_URL.to_string();

        config.poll_interval_secs = 600;
        assert!(config.validate().is_err());
    }
}
