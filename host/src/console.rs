//! In-process service host.
//!
//! [`ConsoleHost`] runs a service in the foreground. It records every
//! registration call in [`HostSettings`], starts the service, and then
//! serves stop, pause and continue requests from its control channel while
//! watching for the service to end on its own.

use crate::exit::RunOutcome;
use crate::host::{HostConfigurator, ServiceHost};
use crate::lifecycle::{LifecycleEvent, ServiceControl};
use crate::option::{RunAs, StartPattern};
use crate::recovery::{RecoveryCallback, RecoveryConfigurator};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

/// How often the host checks on the service between control requests
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Requests the console host accepts while the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Stop,
    Pause,
    Continue,
}

impl From<ControlRequest> for LifecycleEvent {
    fn from(request: ControlRequest) -> Self {
        match request {
            ControlRequest::Stop => LifecycleEvent::Stop,
            ControlRequest::Pause => LifecycleEvent::Pause,
            ControlRequest::Continue => LifecycleEvent::Continue,
        }
    }
}

/// Sends control requests to a running [`ConsoleHost`].
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<ControlRequest>,
}

impl ControlHandle {
    /// Send a request. Returns `false` once the host has exited.
    pub fn send(&self, request: ControlRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    pub fn stop(&self) -> bool {
        self.send(ControlRequest::Stop)
    }

    pub fn pause(&self) -> bool {
        self.send(ControlRequest::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(ControlRequest::Continue)
    }
}

/// Exit codes of the console host. Values follow the Win32 error codes a
/// service control manager would report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ConsoleExit {
    Ok = 0,
    /// No service was registered during setup
    ServiceNotConfigured = 1,
    /// A lifecycle callback failed
    ServiceControlRequestFailed = 1064,
    /// The service ended without a stop request
    ServiceExited = 1067,
}

impl RunOutcome for ConsoleExit {
    type Code = u32;

    fn code(&self) -> u32 {
        *self as u32
    }
}

/// Everything registered with the console host during setup.
#[derive(Default)]
pub struct HostSettings {
    pub service_name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub run_as: Option<RunAs>,
    pub start_pattern: Option<StartPattern>,
    pub recovery: Option<RecoveryConfigurator>,
    control: Option<Box<dyn ServiceControl>>,
}

impl HostSettings {
    pub fn has_service(&self) -> bool {
        self.control.is_some()
    }
}

impl std::fmt::Debug for HostSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSettings")
            .field("service_name", &self.service_name)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("run_as", &self.run_as)
            .field("start_pattern", &self.start_pattern)
            .field("recovery", &self.recovery)
            .field("has_service", &self.has_service())
            .finish()
    }
}

impl HostConfigurator for HostSettings {
    fn service(&mut self, control: Box<dyn ServiceControl>) {
        if self.control.is_some() {
            warn!("Service registered twice, replacing the first registration");
        }
        self.control = Some(control);
    }

    fn run_as_local_service(&mut self) {
        self.run_as = Some(RunAs::LocalService);
    }

    fn run_as_local_system(&mut self) {
        self.run_as = Some(RunAs::LocalSystem);
    }

    fn run_as_network_service(&mut self) {
        self.run_as = Some(RunAs::NetworkService);
    }

    fn run_as_prompt(&mut self) {
        self.run_as = Some(RunAs::Prompt);
    }

    fn start_automatically(&mut self) {
        self.start_pattern = Some(StartPattern::Automatically);
    }

    fn start_automatically_delayed(&mut self) {
        self.start_pattern = Some(StartPattern::AutomaticallyDelayed);
    }

    fn start_manually(&mut self) {
        self.start_pattern = Some(StartPattern::Manually);
    }

    fn enable_service_recovery(&mut self, configure: RecoveryCallback) {
        let mut recovery = self.recovery.take().unwrap_or_default();
        configure(&mut recovery);
        self.recovery = Some(recovery);
    }

    fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    fn set_display_name(&mut self, display_name: &str) {
        self.display_name = Some(display_name.to_string());
    }

    fn set_service_name(&mut self, service_name: &str) {
        self.service_name = Some(service_name.to_string());
    }
}

/// Foreground host driven by a [`ControlHandle`].
///
/// `run` blocks the calling thread until the service stops or ends.
pub struct ConsoleHost {
    rx: mpsc::UnboundedReceiver<ControlRequest>,
    observer: Option<Box<dyn FnOnce(&HostSettings) + Send>>,
}

impl ConsoleHost {
    /// Create a host and the handle that controls it.
    pub fn new() -> (Self, ControlHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self { rx, observer: None };
        (host, ControlHandle { tx })
    }

    /// Inspect the registered settings once setup completes.
    pub fn on_configured<F>(mut self, observer: F) -> Self
    where
        F: FnOnce(&HostSettings) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    fn serve(&mut self, control: &mut dyn ServiceControl) -> ConsoleExit {
        let name = control.service_name().to_string();

        if let Err(e) = control.start() {
            error!(service = %name, error = %e, "Service failed to start");
            return ConsoleExit::ServiceControlRequestFailed;
        }

        loop {
            let request = match self.rx.try_recv() {
                Ok(request) => request,
                Err(TryRecvError::Disconnected) => {
                    debug!(service = %name, "Control channel closed, stopping");
                    ControlRequest::Stop
                }
                Err(TryRecvError::Empty) => {
                    match control.poll() {
                        Ok(true) => std::thread::sleep(POLL_INTERVAL),
                        Ok(false) => {
                            warn!(service = %name, "Service ended without a stop request");
                            return ConsoleExit::ServiceExited;
                        }
                        Err(e) => {
                            error!(service = %name, error = %e, "Service ended without a stop request");
                            return ConsoleExit::ServiceExited;
                        }
                    }
                    continue;
                }
            };

            info!(service = %name, ?request, "Control request");
            match (control.handle(request.into()), request) {
                (Ok(()), ControlRequest::Stop) => return ConsoleExit::Ok,
                (Ok(()), _) => {}
                (Err(e), ControlRequest::Stop) => {
                    error!(service = %name, error = %e, "Service failed to stop");
                    return ConsoleExit::ServiceControlRequestFailed;
                }
                // The service is still up, keep serving.
                (Err(e), _) => {
                    warn!(service = %name, state = %control.state(), error = %e, "Control request failed");
                }
            }
        }
    }
}

impl ServiceHost for ConsoleHost {
    type Configurator = HostSettings;
    type Outcome = ConsoleExit;

    fn run<F>(mut self, configure: F) -> ConsoleExit
    where
        F: FnOnce(&mut HostSettings),
    {
        let mut settings = HostSettings::default();
        configure(&mut settings);
        debug!(settings = ?settings, "Console host configured");

        if let Some(observer) = self.observer.take() {
            observer(&settings);
        }

        let Some(mut control) = settings.control.take() else {
            error!("No service was registered with the host");
            return ConsoleExit::ServiceNotConfigured;
        };

        self.serve(control.as_mut())
    }
}
