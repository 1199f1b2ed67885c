// Configuration file types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 9001;
pub const DEFAULT_RPC_PATH: &str = "/RPC2";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupctlConfig {
    pub version: String,
    /// Supervisor instances, visited in the order they are listed
    #[serde(default)]
    pub supervisors: Vec<SupervisorEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorEndpoint {
    pub id: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// XML-RPC path on the supervisord HTTP server
    #[serde(default = "default_rpc_path")]
    pub path: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Timeout for connecting and for listing processes
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    /// Timeout for a stop request. supervisord only answers once the process
    /// has exited, which may take its whole `stopwaitsecs`; unset waits as long
    /// as supervisord does.
    #[serde(with = "humantime_serde", default)]
    pub stop_timeout: Option<Duration>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_rpc_path() -> String {
    DEFAULT_RPC_PATH.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl SupctlConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: SupctlConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != "1" {
            return Err(ConfigError::UnsupportedVersion(self.version.clone()));
        }

        let mut seen = HashSet::new();
        for endpoint in &self.supervisors {
            endpoint.validate()?;

            if !seen.insert(endpoint.id.as_str()) {
                return Err(ConfigError::DuplicateId(endpoint.id.clone()));
            }
        }

        Ok(())
    }
}

impl SupervisorEndpoint {
    /// Build an endpoint with default port, path and timeout
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            path: default_rpc_path(),
            username: None,
            password: None,
            timeout: default_timeout(),
            stop_timeout: None,
        }
    }

    /// Full URL of the XML-RPC handler
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::InvalidId(
                "Supervisor id cannot be empty".to_string(),
            ));
        }

        if !self
            .id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ConfigError::InvalidId(format!(
                "Supervisor id '{}' contains invalid characters",
                self.id
            )));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost(self.id.clone()));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::PasswordWithoutUsername(self.id.clone()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported config version: {0} (expected '1')")]
    UnsupportedVersion(String),

    #[error("Invalid supervisor id: {0}")]
    InvalidId(String),

    #[error("Supervisor id '{0}' is defined more than once")]
    DuplicateId(String),

    #[error("Supervisor '{0}' has no host")]
    MissingHost(String),

    #[error("Supervisor '{0}' sets a password but no username")]
    PasswordWithoutUsername(String),
}
