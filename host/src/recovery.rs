//! Crash recovery configuration.
//!
//! [`RecoveryConfigurator`] belongs to the host: the runner never looks
//! inside it, it only forwards the caller's [`RecoveryCallback`]. Executing
//! the recorded actions is the service manager's job.

use serde::Deserialize;

/// Caller-supplied function that fills in the host's recovery settings.
pub type RecoveryCallback = Box<dyn FnOnce(&mut RecoveryConfigurator) + Send>;

/// One action the manager takes after a failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecoveryAction {
    /// Restart the service
    RestartService { delay_minutes: u32 },
    /// Reboot the machine, broadcasting `message` first
    RestartComputer { delay_minutes: u32, message: String },
    /// Run a program
    RunProgram { delay_minutes: u32, command: String },
    /// Take no action
    TakeNoAction,
}

/// Recovery settings collected by the host.
///
/// Actions apply in order: the first to the first failure, the second to the
/// second, and the last one to every later failure until the failure count
/// resets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryConfigurator {
    actions: Vec<RecoveryAction>,
    reset_period_days: Option<u32>,
    on_crash_only: bool,
}

impl RecoveryConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restart_service(&mut self, delay_minutes: u32) -> &mut Self {
        self.actions
            .push(RecoveryAction::RestartService { delay_minutes });
        self
    }

    pub fn restart_computer(&mut self, delay_minutes: u32, message: impl Into<String>) -> &mut Self {
        self.actions.push(RecoveryAction::RestartComputer {
            delay_minutes,
            message: message.into(),
        });
        self
    }

    pub fn run_program(&mut self, delay_minutes: u32, command: impl Into<String>) -> &mut Self {
        self.actions.push(RecoveryAction::RunProgram {
            delay_minutes,
            command: command.into(),
        });
        self
    }

    pub fn take_no_action(&mut self) -> &mut Self {
        self.actions.push(RecoveryAction::TakeNoAction);
        self
    }

    /// Days without failure after which the failure count resets
    pub fn set_reset_period(&mut self, days: u32) -> &mut Self {
        self.reset_period_days = Some(days);
        self
    }

    /// Only recover when the process crashes, not when it exits with an error
    pub fn on_crash_only(&mut self) -> &mut Self {
        self.on_crash_only = true;
        self
    }

    pub fn actions(&self) -> &[RecoveryAction] {
        &self.actions
    }

    pub fn reset_period_days(&self) -> Option<u32> {
        self.reset_period_days
    }

    pub fn is_crash_only(&self) -> bool {
        self.on_crash_only
    }
}

/// Declarative recovery settings, as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecoveryPolicy {
    #[serde(default)]
    pub actions: Vec<RecoveryAction>,
    #[serde(default)]
    pub reset_period_days: Option<u32>,
    #[serde(default)]
    pub on_crash_only: bool,
}

impl RecoveryPolicy {
    /// Replay the policy onto a host configurator.
    pub fn apply(&self, recovery: &mut RecoveryConfigurator) {
        for action in &self.actions {
            match action {
                RecoveryAction::RestartService { delay_minutes } => {
                    recovery.restart_service(*delay_minutes);
                }
                RecoveryAction::RestartComputer {
                    delay_minutes,
                    message,
                } => {
                    recovery.restart_computer(*delay_minutes, message.clone());
                }
                RecoveryAction::RunProgram {
                    delay_minutes,
                    command,
                } => {
                    recovery.run_program(*delay_minutes, command.clone());
                }
                RecoveryAction::TakeNoAction => {
                    recovery.take_no_action();
                }
            }
        }
        if let Some(days) = self.reset_period_days {
            recovery.set_reset_period(days);
        }
        if self.on_crash_only {
            recovery.on_crash_only();
        }
    }

    pub fn into_callback(self) -> RecoveryCallback {
        Box::new(move |recovery: &mut RecoveryConfigurator| self.apply(recovery))
    }
}
