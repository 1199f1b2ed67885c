// supctl-common - Shared types for talking to supervisord instances

pub mod config;
pub mod process;
pub mod supervisor;

pub use config::{ConfigError, SupctlConfig, SupervisorEndpoint};
pub use process::{ProcessInfo, ProcessState};
pub use supervisor::{FaultCode, Supervisor, SupervisorError};
