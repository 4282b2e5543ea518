//! Debugger attach facility.
//!
//! The lifecycle adapter reaches process-wide debugger state only through
//! [`DiagnosticsPort`], so tests can substitute a recording stub.

use std::time::Duration;
use tracing::{info, warn};

/// Interval between tracer checks while waiting for a debugger.
const ATTACH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Best-effort access to the process debugger.
pub trait DiagnosticsPort: Send {
    /// Whether a debugger is attached to this process
    fn is_attached(&self) -> bool;

    /// Request that a debugger attach to this process
    fn attach(&self);

    /// Stop execution in the attached debugger
    fn break_execution(&self);
}

/// Diagnostics port that never touches process state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDebugger;

impl DiagnosticsPort for NoDebugger {
    fn is_attached(&self) -> bool {
        false
    }

    fn attach(&self) {}

    fn break_execution(&self) {}
}

/// Diagnostics port backed by the real process.
///
/// There is no way to launch a debugger on behalf of the user here, so
/// `attach` announces the pid and blocks until a tracer shows up. It has no
/// timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDebugger;

impl DiagnosticsPort for ProcessDebugger {
    fn is_attached(&self) -> bool {
        tracer_pid().is_some_and(|pid| pid != 0)
    }

    fn attach(&self) {
        if tracer_pid().is_none() {
            warn!("Debugger detection is not supported on this platform, continuing");
            return;
        }

        let pid = std::process::id();
        info!(pid, "Waiting for a debugger to attach");
        while !self.is_attached() {
            std::thread::sleep(ATTACH_POLL_INTERVAL);
        }
        info!(pid, "Debugger attached");
    }

    fn break_execution(&self) {
        if !self.is_attached() {
            // SIGTRAP without a tracer terminates the process.
            warn!("No debugger attached, skipping break");
            return;
        }

        #[cfg(unix)]
        unsafe {
            libc::raise(libc::SIGTRAP);
        }
    }
}

/// Tracer pid from `/proc/self/status`, or `None` where procfs is unavailable.
fn tracer_pid() -> Option<u32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_tracer_pid(&status)
}

fn parse_tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse().ok())
}
