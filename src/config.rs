//! Configuration management for dbx-bridge.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named workspace profiles.

use crate::api::{normalize_host, HttpConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the workspace URL.
pub const HOST_ENV: &str = "DATABRICKS_HOST";

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "DATABRICKS_TOKEN";

/// Environment variable holding the default SQL warehouse.
pub const WAREHOUSE_ENV: &str = "DATABRICKS_WAREHOUSE_ID";

/// Main configuration structure for dbx-bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Named workspace profiles.
    #[serde(default)]
    pub profiles: HashMap<String, WorkspaceConfig>,
}

/// Settings for one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceConfig {
    /// Workspace URL (e.g. `https://adb-123.azuredatabricks.net`).
    pub host: Option<String>,

    /// Personal access token (prefer the environment over storing it here).
    pub token: Option<String>,

    /// Warehouse used for SQL when none is given.
    pub warehouse_id: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            warehouse_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WorkspaceConfig {
    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &WorkspaceConfig) {
        if other.host.is_some() {
            self.host = other.host.clone();
        }
        if other.token.is_some() {
            self.token = other.token.clone();
        }
        if other.warehouse_id.is_some() {
            self.warehouse_id = other.warehouse_id.clone();
        }
        if other.timeout_secs != default_timeout_secs() {
            self.timeout_secs = other.timeout_secs;
        }
    }

    /// Applies environment variables (DATABRICKS_HOST, etc.) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    /// Fills unset fields from a variable lookup.
    pub fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.host.is_none() {
            self.host = non_empty(HOST_ENV);
        }
        if self.token.is_none() {
            self.token = non_empty(TOKEN_ENV);
        }
        if self.warehouse_id.is_none() {
            self.warehouse_id = non_empty(WAREHOUSE_ENV);
        }
    }

    /// Returns the host and token, failing if either is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.host.as_deref(), self.token.as_deref()) {
            (Some(host), Some(token)) if !host.is_empty() && !token.is_empty() => {
                Ok((host, token))
            }
            _ => Err(BridgeError::config(
                "Databricks host and token must be provided",
            )),
        }
    }

    /// Builds the HTTP client configuration.
    pub fn to_http_config(&self) -> Result<HttpConfig> {
        let (host, token) = self.credentials()?;
        Ok(HttpConfig::new(host, token).with_timeout(self.timeout_secs))
    }

    /// Returns the normalized workspace URL.
    pub fn workspace_url(&self) -> Result<String> {
        let (host, _) = self.credentials()?;
        Ok(normalize_host(host)?.as_str().trim_end_matches('/').to_string())
    }

    /// Returns a display-safe string (no token) for log output.
    pub fn display_string(&self) -> String {
        let host = self.host.as_deref().unwrap_or("<no host>");
        match &self.warehouse_id {
            Some(w) => format!("{host} (warehouse {w})"),
            None => host.to_string(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dbx-bridge")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            BridgeError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named profile, or the default profile if name is None.
    pub fn get_profile(&self, name: Option<&str>) -> Option<&WorkspaceConfig> {
        let key = name.unwrap_or("default");
        self.profiles.get(key)
    }

    /// Returns the settings for a profile layered over the default profile.
    ///
    /// Fields the named profile leaves unset come from `[profiles.default]`.
    /// Fails if a named profile does not exist.
    pub fn layered_profile(&self, name: Option<&str>) -> Result<WorkspaceConfig> {
        let mut workspace = self.get_profile(None).cloned().unwrap_or_default();

        if let Some(name) = name {
            let named = self.get_profile(Some(name)).ok_or_else(|| {
                BridgeError::config(format!("Profile '{}' not found in config file", name))
            })?;
            workspace.merge(named);
        }

        Ok(workspace)
    }
}
