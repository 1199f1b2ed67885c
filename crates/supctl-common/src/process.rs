// Managed process model as reported by supervisord

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state as defined by supervisord's `getProcessInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    /// Map a numeric supervisord state code; unrecognised codes become `Unknown`
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ProcessState::Stopped,
            10 => ProcessState::Starting,
            20 => ProcessState::Running,
            30 => ProcessState::Backoff,
            40 => ProcessState::Stopping,
            100 => ProcessState::Exited,
            200 => ProcessState::Fatal,
            _ => ProcessState::Unknown,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ProcessState::Stopped => 0,
            ProcessState::Starting => 10,
            ProcessState::Running => 20,
            ProcessState::Backoff => 30,
            ProcessState::Stopping => 40,
            ProcessState::Exited => 100,
            ProcessState::Fatal => 200,
            ProcessState::Unknown => 1000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Stopped => "STOPPED",
            ProcessState::Starting => "STARTING",
            ProcessState::Running => "RUNNING",
            ProcessState::Backoff => "BACKOFF",
            ProcessState::Stopping => "STOPPING",
            ProcessState::Exited => "EXITED",
            ProcessState::Fatal => "FATAL",
            ProcessState::Unknown => "UNKNOWN",
        }
    }

    /// Whether supervisord would accept a stop request for this state
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ProcessState::Starting | ProcessState::Running | ProcessState::Backoff
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub name: String,
    pub group: String,
    pub state: ProcessState,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub description: String,
}

impl ProcessInfo {
    pub fn new(name: impl Into<String>, group: impl Into<String>, state: ProcessState) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            state,
            pid: None,
            description: String::new(),
        }
    }

    /// Name used to address the process on the wire (`group:name`)
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        assert_eq!(ProcessState::from_code(0), ProcessState::Stopped);
        assert_eq!(ProcessState::from_code(20), ProcessState::Running);
        assert_eq!(ProcessState::from_code(200), ProcessState::Fatal);
        assert_eq!(ProcessState::from_code(1000), ProcessState::Unknown);
        assert_eq!(ProcessState::from_code(42), ProcessState::Unknown);

        for state in [
            ProcessState::Stopped,
            ProcessState::Starting,
            ProcessState::Running,
            ProcessState::Backoff,
            ProcessState::Stopping,
            ProcessState::Exited,
            ProcessState::Fatal,
            ProcessState::Unknown,
        ] {
            assert_eq!(ProcessState::from_code(state.code()), state);
        }
    }

    #[test]
    fn test_is_running() {
        assert!(ProcessState::Running.is_running());
        assert!(ProcessState::Backoff.is_running());
        assert!(!ProcessState::Stopped.is_running());
        assert!(!ProcessState::Exited.is_running());
    }

    #[test]
    fn test_full_name() {
        let process = ProcessInfo::new("worker_00", "worker", ProcessState::Running);
        assert_eq!(process.full_name(), "worker:worker_00");
        assert_eq!(process.state.to_string(), "RUNNING");
    }
}
