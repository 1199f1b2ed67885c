// Locating the supervisor list

use anyhow::{anyhow, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

pub const CONFIG_ENV: &str = "SUPCTL_CONFIG";
pub const CONFIG_FILE_NAME: &str = "supctl.yaml";

/// Where the configuration file was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Argument,
    Environment,
    WorkingDirectory,
    HomeDirectory,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Argument => write!(f, "--config argument"),
            ConfigSource::Environment => write!(f, "{} environment variable", CONFIG_ENV),
            ConfigSource::WorkingDirectory => write!(f, "current directory"),
            ConfigSource::HomeDirectory => write!(f, "home directory"),
        }
    }
}

/// Resolve the configuration file. Explicit locations (argument, then
/// `SUPCTL_CONFIG`) must exist; otherwise `./supctl.yaml` and
/// `~/.supctl/supctl.yaml` are tried in turn.
pub fn discover_config(cli_config: Option<PathBuf>) -> Result<PathBuf> {
    discover_config_with_source(cli_config).map(|(path, _)| path)
}

pub fn discover_config_with_source(
    cli_config: Option<PathBuf>,
) -> Result<(PathBuf, ConfigSource)> {
    let explicit = cli_config
        .map(|path| (path, ConfigSource::Argument))
        .or_else(|| {
            std::env::var_os(CONFIG_ENV).map(|p| (PathBuf::from(p), ConfigSource::Environment))
        });

    if let Some((path, source)) = explicit {
        if !path.exists() {
            return Err(anyhow!(
                "Config file from {} not found: {:?}",
                source,
                path
            ));
        }
        debug!("Using config from {}: {:?}", source, path);
        return Ok((path, source));
    }

    let mut tried = Vec::new();
    for (path, source) in fallback_candidates() {
        if path.exists() {
            debug!("Using config from {}: {:?}", source, path);
            return Ok((path, source));
        }
        tried.push(path);
    }

    let tried = tried
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(anyhow!(
        "Configuration file not found. Tried:\n{}\n\n\
         Create a {} listing your supervisors, pass --config <path> or set {}",
        tried,
        CONFIG_FILE_NAME,
        CONFIG_ENV
    ))
}

fn fallback_candidates() -> Vec<(PathBuf, ConfigSource)> {
    let mut candidates = vec![(
        PathBuf::from(".").join(CONFIG_FILE_NAME),
        ConfigSource::WorkingDirectory,
    )];
    if let Some(home) = dirs::home_dir() {
        candidates.push((
            home.join(".supctl").join(CONFIG_FILE_NAME),
            ConfigSource::HomeDirectory,
        ));
    }
    candidates
}
