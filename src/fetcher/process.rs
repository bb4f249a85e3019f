//! Running-instance detection.
//!
//! A running emulator holds its executable and DLLs open, so replacing files
//! underneath it fails on Windows and leaves a mixed installation elsewhere.
//! The check is best effort: it only looks, and never terminates anything.

use crate::config::UpdaterConfig;
use crate::core::UpdaterError;
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

/// A process as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub pid: u32,
}

impl ProcessInfo {
    pub fn new(name: impl Into<String>, pid: u32) -> Self {
        Self {
            name: name.into(),
            pid,
        }
    }
}

/// Capability for listing running processes.
pub trait ProcessInspector: Send + Sync {
    fn list_processes(&self) -> Vec<ProcessInfo>;

    /// Id of the current process, never reported as a conflict.
    fn current_pid(&self) -> Option<u32> {
        Some(std::process::id())
    }
}

/// The real OS process table, read through `sysinfo`.
#[derive(Debug, Default)]
pub struct SystemProcesses;

impl ProcessInspector for SystemProcesses {
    fn list_processes(&self) -> Vec<ProcessInfo> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        system
            .processes()
            .iter()
            .map(|(pid, process)| {
                ProcessInfo::new(process.name().to_string_lossy(), pid.as_u32())
            })
            .collect()
    }

    fn current_pid(&self) -> Option<u32> {
        sysinfo::get_current_pid().ok().map(|pid| pid.as_u32())
    }
}

/// Fail with [`UpdaterError::InstanceRunning`] if a process matching the
/// emulator executable is running. The updater's own process is skipped.
pub fn ensure_no_running_instance<I>(
    config: &UpdaterConfig,
    inspector: &I,
) -> Result<(), UpdaterError>
where
    I: ProcessInspector + ?Sized,
{
    let own_pid = inspector.current_pid();

    let conflict = inspector.list_processes().into_iter().find(|process| {
        Some(process.pid) != own_pid
            && config.process_match.matches(&process.name, &config.executable_name)
    });

    match conflict {
        Some(process) => Err(UpdaterError::InstanceRunning {
            name: process.name,
            pid: process.pid,
        }),
        None => {
            debug!("No running {} instance", config.executable_name);
            Ok(())
        }
    }
}
