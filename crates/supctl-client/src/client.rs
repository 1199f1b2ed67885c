// Supervisor implementation backed by supervisord's XML-RPC interface

use crate::xmlrpc::{self, MethodResponse, Value};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::error::Error as _;
use std::time::Duration;
use supctl_common::{ProcessInfo, ProcessState, Supervisor, SupervisorEndpoint, SupervisorError};
use tracing::debug;

pub struct XmlRpcSupervisor {
    endpoint: SupervisorEndpoint,
    url: String,
    http: reqwest::Client,
}

impl XmlRpcSupervisor {
    pub fn new(endpoint: SupervisorEndpoint) -> Result<Self, SupervisorError> {
        // Request timeouts are set per call; see `call`
        let http = reqwest::Client::builder()
            .connect_timeout(endpoint.timeout)
            .build()
            .map_err(|e| SupervisorError::Transport(e.to_string()))?;

        Ok(Self {
            url: endpoint.url(),
            endpoint,
            http,
        })
    }

    pub fn endpoint(&self) -> &SupervisorEndpoint {
        &self.endpoint
    }

    /// Issue one XML-RPC call. `subject` names the process faults refer to;
    /// `timeout` bounds the whole request, `None` waits for the reply.
    async fn call(
        &self,
        method: &str,
        params: &[Value],
        subject: &str,
        timeout: Option<Duration>,
    ) -> Result<Value, SupervisorError> {
        debug!(supervisor = %self.endpoint.id, method, url = %self.url, ?timeout, "Sending XML-RPC request");

        let mut request = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, params));

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        if let Some(username) = &self.endpoint.username {
            request = request.basic_auth(username, self.endpoint.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupervisorError::Transport(format!(
                "HTTP {} from {}",
                status, self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.url, e))?;

        match xmlrpc::parse_response(&body).map_err(|e| SupervisorError::Protocol(e.to_string()))? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault { code, message } => {
                debug!(supervisor = %self.endpoint.id, method, code, %message, "Supervisor returned fault");
                Err(SupervisorError::from_fault(subject, code, message))
            }
        }
    }
}

/// Describe a reqwest failure with its whole cause chain
fn transport_error(url: &str, err: reqwest::Error) -> SupervisorError {
    if err.is_timeout() {
        return SupervisorError::Transport(format!("Request to {} timed out", url));
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    SupervisorError::Transport(message)
}

/// Decode one `getProcessInfo` struct
fn process_from_value(value: &Value) -> Result<ProcessInfo, SupervisorError> {
    let field = |key: &str| {
        value
            .get(key)
            .ok_or_else(|| SupervisorError::Protocol(format!("process info without '{}'", key)))
    };

    let name = field("name")?
        .as_str()
        .ok_or_else(|| SupervisorError::Protocol("process name is not a string".to_string()))?
        .to_string();
    let group = field("group")?
        .as_str()
        .ok_or_else(|| SupervisorError::Protocol("process group is not a string".to_string()))?
        .to_string();
    let state = field("state")?
        .as_i64()
        .map(ProcessState::from_code)
        .ok_or_else(|| SupervisorError::Protocol("process state is not an int".to_string()))?;

    // supervisord reports pid 0 for processes that are not running
    let pid = value
        .get("pid")
        .and_then(Value::as_i64)
        .filter(|pid| *pid > 0)
        .and_then(|pid| u32::try_from(pid).ok());
    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(ProcessInfo {
        name,
        group,
        state,
        pid,
        description,
    })
}

#[async_trait]
impl Supervisor for XmlRpcSupervisor {
    fn id(&self) -> &str {
        &self.endpoint.id
    }

    fn host(&self) -> &str {
        &self.endpoint.host
    }

    // getProcessInfo only accepts a bare name when it equals the group name,
    // so match against the full listing instead.
    async fn get_process(&self, name: &str) -> Result<ProcessInfo, SupervisorError> {
        self.get_processes(None)
            .await?
            .into_iter()
            .find(|p| p.name == name || p.full_name() == name)
            .ok_or_else(|| SupervisorError::UnknownProcess(name.to_string()))
    }

    async fn get_processes(
        &self,
        group: Option<&str>,
    ) -> Result<Vec<ProcessInfo>, SupervisorError> {
        let value = self
            .call(
                "supervisor.getAllProcessInfo",
                &[],
                "",
                Some(self.endpoint.timeout),
            )
            .await?;
        let entries = value.as_array().ok_or_else(|| {
            SupervisorError::Protocol("getAllProcessInfo did not return an array".to_string())
        })?;

        let mut processes = Vec::with_capacity(entries.len());
        for entry in entries {
            let process = process_from_value(entry)?;
            if group.map_or(true, |g| process.group == g) {
                processes.push(process);
            }
        }

        Ok(processes)
    }

    async fn stop_process(&self, process: &ProcessInfo) -> Result<(), SupervisorError> {
        let value = self
            .call(
                "supervisor.stopProcess",
                &[Value::from(process.full_name()), Value::from(true)],
                &process.name,
                self.endpoint.stop_timeout,
            )
            .await?;

        match value.as_bool() {
            Some(true) => Ok(()),
            _ => Err(SupervisorError::Fault {
                code: 0,
                message: format!("supervisor did not confirm stop of {}", process.full_name()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn process_struct(name: &str, group: &str, state: i64, pid: i64) -> Value {
        let mut members = BTreeMap::new();
        members.insert("name".to_string(), Value::from(name));
        members.insert("group".to_string(), Value::from(group));
        members.insert("state".to_string(), Value::Int(state));
        members.insert("pid".to_string(), Value::Int(pid));
        Value::Struct(members)
    }

    #[test]
    fn test_process_from_value() {
        let process = process_from_value(&process_struct("web", "frontend", 20, 99)).unwrap();
        assert_eq!(process.name, "web");
        assert_eq!(process.group, "frontend");
        assert_eq!(process.state, ProcessState::Running);
        assert_eq!(process.pid, Some(99));
        assert_eq!(process.description, "");
    }

    #[test]
    fn test_process_from_value_zero_pid() {
        let process = process_from_value(&process_struct("worker", "worker", 0, 0)).unwrap();
        assert_eq!(process.state, ProcessState::Stopped);
        assert_eq!(process.pid, None);
    }

    #[test]
    fn test_process_from_value_missing_field() {
        let mut members = BTreeMap::new();
        members.insert("name".to_string(), Value::from("web"));
        let result = process_from_value(&Value::Struct(members));
        assert!(matches!(result, Err(SupervisorError::Protocol(_))));
    }

    #[test]
    fn test_new_uses_endpoint_url() {
        let supervisor =
            XmlRpcSupervisor::new(SupervisorEndpoint::new("web-01", "10.0.0.5")).unwrap();
        assert_eq!(supervisor.id(), "web-01");
        assert_eq!(supervisor.host(), "10.0.0.5");
        assert_eq!(supervisor.url, "http://10.0.0.5:9001/RPC2");
    }
}
