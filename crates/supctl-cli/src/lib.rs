// supctl CLI library

pub mod commands;
pub mod config_discovery;
pub mod console;

use anyhow::{Context, Result};
use supctl_client::XmlRpcSupervisor;
use supctl_common::{SupctlConfig, Supervisor};

/// Build one XML-RPC client per configured supervisor, in configuration order
pub fn connect_supervisors(config: &SupctlConfig) -> Result<Vec<Box<dyn Supervisor>>> {
    config
        .supervisors
        .iter()
        .map(|endpoint| {
            XmlRpcSupervisor::new(endpoint.clone())
                .map(|s| Box::new(s) as Box<dyn Supervisor>)
                .with_context(|| format!("Failed to create client for supervisor '{}'", endpoint.id))
        })
        .collect()
}
