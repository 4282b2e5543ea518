//! Lifecycle adapter between the service host and an application service.
//!
//! The host delivers four events (start, stop, pause, continue). The adapter
//! checks each one against the service state machine, runs the debug gate on
//! start, and forwards the event to the [`HostedService`].
//!
//! ```text
//! Stopped -start-> Starting -> Running -pause-> Pausing -> Paused
//! Paused -continue-> Continuing -> Running
//! Running | Paused -stop-> Stopping -> Stopped
//! ```

use crate::diagnostics::DiagnosticsPort;
use crate::error::{Error, Result};
use crate::option::ServiceOption;
use std::fmt;
use tracing::{debug, error, info};

/// Operations every application service provides to the host.
///
/// Errors returned here are not handled by the adapter; they travel to the
/// host, which decides how to report the failure.
pub trait HostedService: Send + 'static {
    /// Begin work. `args` are the process arguments.
    fn start(&mut self, args: &[String], option: &ServiceOption) -> anyhow::Result<()>;

    /// Stop work and release resources.
    fn stop(&mut self) -> anyhow::Result<()>;

    /// The manager paused the service.
    fn paused(&mut self) -> anyhow::Result<()>;

    /// The manager resumed a paused service.
    fn continued(&mut self) -> anyhow::Result<()>;

    /// Whether the service is still doing work. Hosts that supervise the
    /// service poll this between control requests. `Ok(false)` means it
    /// finished on its own, `Err` that it ended abnormally.
    fn is_running(&mut self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// State of a hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    Pausing,
    Paused,
    Continuing,
    Stopping,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Stopped => "stopped",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Pausing => "pausing",
            LifecycleState::Paused => "paused",
            LifecycleState::Continuing => "continuing",
            LifecycleState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Control event delivered by the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Start,
    Stop,
    Pause,
    Continue,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleEvent::Start => "start",
            LifecycleEvent::Stop => "stop",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::Continue => "continue",
        };
        f.write_str(s)
    }
}

/// States visited by one accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    /// State held while the service callback runs
    during: LifecycleState,
    /// State after the callback succeeds
    success: LifecycleState,
    /// State after the callback fails
    failure: LifecycleState,
}

impl Transition {
    /// Transition table. `None` means the event is not accepted in `from`.
    fn lookup(from: LifecycleState, event: LifecycleEvent) -> Option<Self> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        let (during, success, failure) = match (from, event) {
            (S::Stopped, E::Start) => (S::Starting, S::Running, S::Stopped),
            (S::Running | S::Paused, E::Stop) => (S::Stopping, S::Stopped, S::Stopped),
            (S::Running, E::Pause) => (S::Pausing, S::Paused, S::Running),
            (S::Paused, E::Continue) => (S::Continuing, S::Running, S::Paused),
            _ => return None,
        };
        Some(Self {
            during,
            success,
            failure,
        })
    }
}

/// Lifecycle interface the host drives.
pub trait ServiceControl: Send {
    /// Name the service was registered under
    fn service_name(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> LifecycleState;

    /// Deliver a control event
    fn handle(&mut self, event: LifecycleEvent) -> Result<()>;

    fn start(&mut self) -> Result<()> {
        self.handle(LifecycleEvent::Start)
    }

    fn stop(&mut self) -> Result<()> {
        self.handle(LifecycleEvent::Stop)
    }

    fn pause(&mut self) -> Result<()> {
        self.handle(LifecycleEvent::Pause)
    }

    fn resume(&mut self) -> Result<()> {
        self.handle(LifecycleEvent::Continue)
    }

    /// Check whether the service is still alive. A service that ended on
    /// its own is moved to `Stopped`.
    fn poll(&mut self) -> Result<bool> {
        Ok(self.state() != LifecycleState::Stopped)
    }
}

/// Binds one application service instance to the host's lifecycle events.
pub struct LifecycleAdapter<S, D> {
    service: S,
    args: Vec<String>,
    option: ServiceOption,
    debug: bool,
    diagnostics: D,
    state: LifecycleState,
}

impl<S, D> LifecycleAdapter<S, D>
where
    S: HostedService,
    D: DiagnosticsPort,
{
    /// Wrap a service. `args` and `option` are handed to its `start`.
    pub fn new(service: S, args: Vec<String>, option: ServiceOption, diagnostics: D) -> Self {
        Self {
            service,
            args,
            option,
            debug: false,
            diagnostics,
            state: LifecycleState::Stopped,
        }
    }

    /// Break into the debugger every time the service starts.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The wrapped service
    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    fn enter(&mut self, next: LifecycleState) {
        debug!(
            service = %self.option.service_name,
            from = %self.state,
            to = %next,
            "Lifecycle transition"
        );
        self.state = next;
    }

    /// Wait for a debugger and break before the service runs any start code.
    fn debug_gate(&mut self) {
        if !self.debug {
            return;
        }
        if !self.diagnostics.is_attached() {
            self.diagnostics.attach();
        }
        self.diagnostics.break_execution();
    }

    fn dispatch(&mut self, event: LifecycleEvent) -> anyhow::Result<()> {
        match event {
            LifecycleEvent::Start => {
                self.debug_gate();
                self.service.start(&self.args, &self.option)
            }
            LifecycleEvent::Stop => self.service.stop(),
            LifecycleEvent::Pause => self.service.paused(),
            LifecycleEvent::Continue => self.service.continued(),
        }
    }
}

impl<S, D> ServiceControl for LifecycleAdapter<S, D>
where
    S: HostedService,
    D: DiagnosticsPort,
{
    fn service_name(&self) -> &str {
        &self.option.service_name
    }

    fn state(&self) -> LifecycleState {
        self.state
    }

    fn handle(&mut self, event: LifecycleEvent) -> Result<()> {
        let transition =
            Transition::lookup(self.state, event).ok_or(Error::InvalidTransition {
                from: self.state,
                event,
            })?;

        self.enter(transition.during);
        match self.dispatch(event) {
            Ok(()) => {
                self.enter(transition.success);
                info!(service = %self.option.service_name, state = %self.state, "Service {}", self.state);
                Ok(())
            }
            Err(source) => {
                self.enter(transition.failure);
                error!(service = %self.option.service_name, %event, error = %source, "Service callback failed");
                Err(Error::Callback { event, source })
            }
        }
    }

    fn poll(&mut self) -> Result<bool> {
        if !matches!(self.state, LifecycleState::Running | LifecycleState::Paused) {
            return Ok(self.state != LifecycleState::Stopped);
        }

        match self.service.is_running() {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.enter(LifecycleState::Stopped);
                info!(service = %self.option.service_name, "Service finished on its own");
                Ok(false)
            }
            Err(source) => {
                self.enter(LifecycleState::Stopped);
                error!(service = %self.option.service_name, error = %source, "Service ended unexpectedly");
                Err(Error::Exited(source))
            }
        }
    }
}
