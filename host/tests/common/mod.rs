//! Shared test doubles for the host adapter integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use warden_host::{
    DiagnosticsPort, Error, HostConfigurator, HostedService, RecoveryCallback,
    RecoveryConfigurator, RunOutcome, ServiceControl, ServiceHost, ServiceOption,
};

pub type Calls = Arc<Mutex<Vec<String>>>;

pub fn snapshot(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().clone()
}

/// Configurator that logs every registration call.
pub struct RecordingConfigurator {
    calls: Calls,
    control: Option<Box<dyn ServiceControl>>,
    pub recovery: Option<RecoveryConfigurator>,
}

impl RecordingConfigurator {
    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl HostConfigurator for RecordingConfigurator {
    fn service(&mut self, control: Box<dyn ServiceControl>) {
        self.push(format!("service {}", control.service_name()));
        self.control = Some(control);
    }
    fn run_as_local_service(&mut self) {
        self.push("run_as_local_service");
    }
    fn run_as_local_system(&mut self) {
        self.push("run_as_local_system");
    }
    fn run_as_network_service(&mut self) {
        self.push("run_as_network_service");
    }
    fn run_as_prompt(&mut self) {
        self.push("run_as_prompt");
    }
    fn start_automatically(&mut self) {
        self.push("start_automatically");
    }
    fn start_automatically_delayed(&mut self) {
        self.push("start_automatically_delayed");
    }
    fn start_manually(&mut self) {
        self.push("start_manually");
    }
    fn enable_service_recovery(&mut self, configure: RecoveryCallback) {
        self.push("enable_service_recovery");
        let mut recovery = RecoveryConfigurator::new();
        configure(&mut recovery);
        self.recovery = Some(recovery);
    }
    fn set_description(&mut self, description: &str) {
        self.push(format!("set_description {}", description));
    }
    fn set_display_name(&mut self, display_name: &str) {
        self.push(format!("set_display_name {}", display_name));
    }
    fn set_service_name(&mut self, service_name: &str) {
        self.push(format!("set_service_name {}", service_name));
    }
}

/// Host that records registrations, then starts and stops the service once.
pub struct RecordingHost<O> {
    pub calls: Calls,
    pub lifecycle_errors: Arc<Mutex<Vec<Error>>>,
    pub recovery: Arc<Mutex<Option<RecoveryConfigurator>>>,
    outcome: O,
}

impl<O: RunOutcome> RecordingHost<O> {
    pub fn new(outcome: O) -> Self {
        Self {
            calls: Calls::default(),
            lifecycle_errors: Arc::default(),
            recovery: Arc::default(),
            outcome,
        }
    }
}

impl<O: RunOutcome> ServiceHost for RecordingHost<O> {
    type Configurator = RecordingConfigurator;
    type Outcome = O;

    fn run<F>(self, configure: F) -> O
    where
        F: FnOnce(&mut RecordingConfigurator),
    {
        self.calls.lock().unwrap().push("run".to_string());
        let mut cfg = RecordingConfigurator {
            calls: Arc::clone(&self.calls),
            control: None,
            recovery: None,
        };
        configure(&mut cfg);
        *self.recovery.lock().unwrap() = cfg.recovery.take();

        if let Some(mut control) = cfg.control.take() {
            let mut errors = self.lifecycle_errors.lock().unwrap();
            match control.start() {
                Ok(()) => {
                    if let Err(e) = control.stop() {
                        errors.push(e);
                    }
                }
                Err(e) => errors.push(e),
            }
        }
        self.outcome
    }
}

/// Debugger stub that logs into a shared call list.
pub struct RecordingDebugger {
    pub calls: Calls,
    pub attached: bool,
}

impl DiagnosticsPort for RecordingDebugger {
    fn is_attached(&self) -> bool {
        self.calls.lock().unwrap().push("is_attached".to_string());
        self.attached
    }
    fn attach(&self) {
        self.calls.lock().unwrap().push("attach".to_string());
    }
    fn break_execution(&self) {
        self.calls.lock().unwrap().push("break".to_string());
    }
}

/// Service that logs lifecycle calls into a static list.
pub fn log_event(log: &Mutex<Vec<String>>, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// Service that accepts every lifecycle call.
#[derive(Default)]
pub struct NoopService;

impl HostedService for NoopService {
    fn start(&mut self, _args: &[String], _option: &ServiceOption) -> anyhow::Result<()> {
        Ok(())
    }
    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn paused(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn continued(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
