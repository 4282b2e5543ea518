//! Command service: supervises an ordinary program as the hosted service.
//!
//! The program and its arguments arrive as the start arguments. Pause and
//! continue map to `SIGSTOP` / `SIGCONT`; stop sends `SIGTERM` and falls back
//! to `SIGKILL` after a grace period. A program that exits by itself ends the
//! service: a zero status counts as finished, anything else as a failure.

use anyhow::{bail, Context, Result};
use host::{HostedService, ServiceOption};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::process::{Child, Command};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Time a stopping process gets to exit before it is killed
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Hosted service that runs a child process.
#[derive(Debug, Default)]
pub struct CommandService {
    name: String,
    child: Option<Child>,
}

impl CommandService {
    fn signal(&self, signal: Signal) -> Result<()> {
        let child = self
            .child
            .as_ref()
            .context("service process is not running")?;
        let pid = Pid::from_raw(child.id() as i32);

        kill(pid, signal).with_context(|| format!("failed to send {} to {}", signal, pid))?;
        debug!(service = %self.name, %pid, ?signal, "Signaled service process");
        Ok(())
    }

    /// Wait for the child to exit, killing it once the grace period ends.
    fn reap(&self, child: &mut Child) -> Result<()> {
        let deadline = Instant::now() + STOP_GRACE_PERIOD;
        loop {
            if let Some(status) = child.try_wait()? {
                info!(service = %self.name, %status, "Service process exited");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(service = %self.name, pid = child.id(), "Service process ignored SIGTERM, killing");
                child.kill()?;
                let status = child.wait()?;
                info!(service = %self.name, %status, "Service process killed");
                return Ok(());
            }
            std::thread::sleep(EXIT_POLL_INTERVAL);
        }
    }
}

impl HostedService for CommandService {
    fn start(&mut self, args: &[String], option: &ServiceOption) -> Result<()> {
        let (program, rest) = args.split_first().context("no command to run")?;
        self.name = option.service_name.clone();

        let child = Command::new(program)
            .args(rest)
            .env("WARDEN_SERVICE_NAME", &option.service_name)
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", program))?;

        info!(service = %self.name, pid = child.id(), program = %program, "Spawned service process");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if child.try_wait()?.is_none() {
            let pid = Pid::from_raw(child.id() as i32);
            // A stopped process cannot act on SIGTERM until it is resumed.
            if let Err(e) = kill(pid, Signal::SIGCONT) {
                debug!(service = %self.name, %pid, error = %e, "Failed to resume service process before stop");
            }
            kill(pid, Signal::SIGTERM).context("failed to send SIGTERM")?;
        }
        self.reap(&mut child)
    }

    fn paused(&mut self) -> Result<()> {
        self.signal(Signal::SIGSTOP)
    }

    fn continued(&mut self) -> Result<()> {
        self.signal(Signal::SIGCONT)
    }

    fn is_running(&mut self) -> Result<bool> {
        let Some(child) = self.child.as_mut() else {
            return Ok(false);
        };
        let Some(status) = child.try_wait()? else {
            return Ok(true);
        };

        self.child = None;
        info!(service = %self.name, %status, "Service process exited");
        if !status.success() {
            bail!("service process exited with {}", status);
        }
        Ok(false)
    }
}
