//! Supervisor port
//! Interface to a single remote supervisord instance

use crate::process::ProcessInfo;
use async_trait::async_trait;
use thiserror::Error;

/// Fault codes returned by supervisord's XML-RPC interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    UnknownMethod,
    IncorrectParameters,
    BadArguments,
    SignatureUnsupported,
    ShutdownState,
    BadName,
    BadSignal,
    NoFile,
    NotExecutable,
    Failed,
    AbnormalTermination,
    SpawnError,
    AlreadyStarted,
    NotRunning,
    Success,
    AlreadyAdded,
    StillRunning,
    CantReread,
}

impl FaultCode {
    pub fn from_code(code: i64) -> Option<Self> {
        let fault = match code {
            1 => FaultCode::UnknownMethod,
            2 => FaultCode::IncorrectParameters,
            3 => FaultCode::BadArguments,
            4 => FaultCode::SignatureUnsupported,
            6 => FaultCode::ShutdownState,
            10 => FaultCode::BadName,
            11 => FaultCode::BadSignal,
            20 => FaultCode::NoFile,
            21 => FaultCode::NotExecutable,
            30 => FaultCode::Failed,
            40 => FaultCode::AbnormalTermination,
            50 => FaultCode::SpawnError,
            60 => FaultCode::AlreadyStarted,
            70 => FaultCode::NotRunning,
            80 => FaultCode::Success,
            90 => FaultCode::AlreadyAdded,
            91 => FaultCode::StillRunning,
            92 => FaultCode::CantReread,
            _ => return None,
        };
        Some(fault)
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The named process does not exist on this supervisor
    #[error("Process \"{0}\" does not exist")]
    UnknownProcess(String),

    /// Stop requested on a process that was already stopped
    #[error("Process \"{0}\" is not running")]
    NotRunning(String),

    #[error("Supervisor fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Protocol(String),
}

impl SupervisorError {
    /// Classify a fault response for an operation on `name`
    pub fn from_fault(name: &str, code: i64, message: impl Into<String>) -> Self {
        match FaultCode::from_code(code) {
            Some(FaultCode::BadName) => SupervisorError::UnknownProcess(name.to_string()),
            Some(FaultCode::NotRunning) => SupervisorError::NotRunning(name.to_string()),
            _ => SupervisorError::Fault {
                code,
                message: message.into(),
            },
        }
    }
}

/// Port for one supervisor endpoint
#[async_trait]
pub trait Supervisor: Send + Sync {
    fn id(&self) -> &str;

    fn host(&self) -> &str;

    /// Look up a single process by name (`name` or `group:name`)
    async fn get_process(&self, name: &str) -> Result<ProcessInfo, SupervisorError>;

    /// All processes, or only those in `group`. Unknown groups yield an empty list.
    async fn get_processes(&self, group: Option<&str>)
        -> Result<Vec<ProcessInfo>, SupervisorError>;

    /// Stop a process and wait for it to exit
    async fn stop_process(&self, process: &ProcessInfo) -> Result<(), SupervisorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        assert!(matches!(
            SupervisorError::from_fault("web", 70, "NOT_RUNNING: web"),
            SupervisorError::NotRunning(name) if name == "web"
        ));
        assert!(matches!(
            SupervisorError::from_fault("ghost", 10, "BAD_NAME: ghost"),
            SupervisorError::UnknownProcess(name) if name == "ghost"
        ));
        assert!(matches!(
            SupervisorError::from_fault("web", 30, "FAILED: web"),
            SupervisorError::Fault { code: 30, .. }
        ));
        assert!(matches!(
            SupervisorError::from_fault("web", 999, "whatever"),
            SupervisorError::Fault { code: 999, .. }
        ));
    }

    #[test]
    fn test_fault_message_is_kept() {
        let err = SupervisorError::from_fault("web", 40, "ABNORMAL_TERMINATION: web");
        assert_eq!(
            err.to_string(),
            "Supervisor fault 40: ABNORMAL_TERMINATION: web"
        );
    }

    #[test]
    fn test_unknown_fault_code() {
        assert_eq!(FaultCode::from_code(5), None);
        assert_eq!(FaultCode::from_code(70), Some(FaultCode::NotRunning));
    }
}
