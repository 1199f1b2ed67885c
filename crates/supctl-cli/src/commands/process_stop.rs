// supctl process:stop - Stop processes on every configured supervisor

use crate::console::Console;
use std::io::{self, Write};
use supctl_common::{ProcessInfo, Supervisor, SupervisorError};
use tracing::debug;

const HELP: &str = "\
Stops supervisor processes on every configured supervisor instance.

Use --id or --host to target specific supervisor instances.
Use --group to stop only the processes of one group, or --process to stop a
single process by name. When --process is given, --group is ignored.";

#[derive(clap::Args, Debug, Default, Clone)]
#[command(long_about = HELP)]
pub struct ProcessStopArgs {
    /// Name of the process to stop
    #[arg(long, value_name = "NAME")]
    pub process: Option<String>,

    /// Only stop processes in this group
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Only target the supervisor with this id
    #[arg(long)]
    pub id: Option<String>,

    /// Only target supervisors on this host
    #[arg(long)]
    pub host: Option<String>,
}

impl ProcessStopArgs {
    fn selects(&self, supervisor: &dyn Supervisor) -> bool {
        self.id.as_deref().map_or(true, |id| id == supervisor.id())
            && self.host.as_deref().map_or(true, |host| host == supervisor.host())
    }

    /// `--process`, treating an empty value as not given
    fn process_name(&self) -> Option<&str> {
        self.process.as_deref().filter(|s| !s.is_empty())
    }

    /// `--group`, treating an empty value as not given
    fn group_name(&self) -> Option<&str> {
        self.group.as_deref().filter(|s| !s.is_empty())
    }

    fn selector_description(&self) -> Option<String> {
        let parts: Vec<String> = [("id", &self.id), ("host", &self.host)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{} \"{}\"", key, v)))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" and "))
    }
}

/// Result of one reported action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stopped,
    /// The process was already stopped
    NotRunning,
    StopFailed(String),
    /// The named process could not be resolved, or the process list could not be fetched
    ResolutionFailed(String),
    /// A group filter matched no process
    EmptyGroup(String),
    NoSupervisorSelected(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Stopped | Outcome::NotRunning)
    }
}

/// Outcomes of a run, tagged with the supervisor they belong to
#[derive(Debug, Default)]
pub struct StopReport {
    entries: Vec<(String, Outcome)>,
}

impl StopReport {
    fn record(&mut self, supervisor: &str, outcome: Outcome) {
        self.entries.push((supervisor.to_string(), outcome));
    }

    pub fn entries(&self) -> &[(String, Outcome)] {
        &self.entries
    }

    /// True once any outcome was a failure; later successes never clear it
    pub fn failed(&self) -> bool {
        self.entries
            .iter()
            .fold(false, |failed, (_, outcome)| failed || outcome.is_failure())
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed() {
            1
        } else {
            0
        }
    }
}

pub async fn execute<W: Write>(
    args: &ProcessStopArgs,
    supervisors: &[Box<dyn Supervisor>],
    console: &mut Console<W>,
) -> io::Result<StopReport> {
    let mut report = StopReport::default();

    let selected: Vec<&dyn Supervisor> = supervisors
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| args.selects(*s))
        .collect();

    if selected.is_empty() {
        if let Some(selector) = args.selector_description() {
            let message = format!("No supervisor instance matches {}", selector);
            console.error(&message)?;
            report.record("", Outcome::NoSupervisorSelected(message));
        }
        return Ok(report);
    }

    let process_name = args.process_name();
    let group_name = args.group_name();

    if process_name.is_some() && group_name.is_some() {
        debug!("--group is ignored because --process was given");
    }

    for supervisor in selected {
        console.section(&format!("{} ({})", supervisor.id(), supervisor.host()))?;

        if let Some(name) = process_name {
            let outcome = match supervisor.get_process(name).await {
                Ok(process) => stop_process(console, supervisor, &process).await?,
                Err(e) => {
                    console.error(&e.to_string())?;
                    Outcome::ResolutionFailed(e.to_string())
                }
            };
            report.record(supervisor.id(), outcome);
            continue;
        }

        let processes = match supervisor.get_processes(group_name).await {
            Ok(processes) => processes,
            Err(e) => {
                console.error(&e.to_string())?;
                report.record(supervisor.id(), Outcome::ResolutionFailed(e.to_string()));
                continue;
            }
        };
        debug!(supervisor = supervisor.id(), count = processes.len(), "Resolved processes");

        for process in &processes {
            let outcome = stop_process(console, supervisor, process).await?;
            report.record(supervisor.id(), outcome);
        }

        if let Some(group) = group_name {
            if processes.is_empty() {
                console.error(&format!("A process with group \"{}\" does not exist", group))?;
                report.record(supervisor.id(), Outcome::EmptyGroup(group.to_string()));
            }
        }
    }

    Ok(report)
}

/// Request a single stop and report how it went. `NotRunning` is not a failure.
pub async fn stop_process<W: Write>(
    console: &mut Console<W>,
    supervisor: &dyn Supervisor,
    process: &ProcessInfo,
) -> io::Result<Outcome> {
    let name = console.highlight(&process.name);
    console.comment(&format!("Stopping process {}", name))?;
    debug!(supervisor = supervisor.id(), process = %process.full_name(), "Stopping process");

    match supervisor.stop_process(process).await {
        Ok(()) => {
            console.success("Stopped")?;
            Ok(Outcome::Stopped)
        }
        Err(SupervisorError::NotRunning(_)) => {
            console.warning("Not running")?;
            Ok(Outcome::NotRunning)
        }
        Err(e) => {
            let message = e.to_string();
            console.error(&message)?;
            Ok(Outcome::StopFailed(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_sticks() {
        let mut report = StopReport::default();
        report.record("a", Outcome::Stopped);
        assert_eq!(report.exit_code(), 0);

        report.record("a", Outcome::StopFailed("boom".to_string()));
        report.record("b", Outcome::Stopped);
        report.record("b", Outcome::NotRunning);
        assert!(report.failed());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_empty_report_succeeds() {
        assert_eq!(StopReport::default().exit_code(), 0);
    }

    #[test]
    fn test_outcome_classification() {
        assert!(!Outcome::Stopped.is_failure());
        assert!(!Outcome::NotRunning.is_failure());
        assert!(Outcome::StopFailed(String::new()).is_failure());
        assert!(Outcome::ResolutionFailed(String::new()).is_failure());
        assert!(Outcome::EmptyGroup("g".to_string()).is_failure());
    }

    #[test]
    fn test_empty_filters_are_not_given() {
        let args = ProcessStopArgs {
            process: Some(String::new()),
            group: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(args.process_name(), None);
        assert_eq!(args.group_name(), None);

        let args = process("web");
        assert_eq!(args.process_name(), Some("web"));
    }

    fn process(name: &str) -> ProcessStopArgs {
        ProcessStopArgs {
            process: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_selector_description() {
        let args = ProcessStopArgs::default();
        assert_eq!(args.selector_description(), None);

        let args = ProcessStopArgs {
            id: Some("web-01".to_string()),
            host: Some("10.0.0.5".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.selector_description().as_deref(),
            Some("id \"web-01\" and host \"10.0.0.5\"")
        );
    }
}
