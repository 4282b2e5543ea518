//! Service manager abstraction.
//!
//! A [`ServiceHost`] owns the run loop; during setup it hands the runner a
//! [`HostConfigurator`] to register the service and its settings.

use crate::exit::RunOutcome;
use crate::lifecycle::ServiceControl;
use crate::recovery::RecoveryCallback;

/// Registration calls a service manager accepts during setup.
pub trait HostConfigurator {
    /// Register the service whose lifecycle the host drives
    fn service(&mut self, control: Box<dyn ServiceControl>);

    fn run_as_local_service(&mut self);
    fn run_as_local_system(&mut self);
    fn run_as_network_service(&mut self);
    /// Ask for the account credentials when the service is installed
    fn run_as_prompt(&mut self);

    fn start_automatically(&mut self);
    fn start_automatically_delayed(&mut self);
    fn start_manually(&mut self);

    /// Configure crash recovery through the host's own configurator
    fn enable_service_recovery(&mut self, configure: RecoveryCallback);

    fn set_description(&mut self, description: &str);
    fn set_display_name(&mut self, display_name: &str);
    fn set_service_name(&mut self, service_name: &str);
}

/// A service manager runtime.
pub trait ServiceHost {
    type Configurator: HostConfigurator;
    type Outcome: RunOutcome;

    /// Apply `configure` and run until the manager stops the service.
    ///
    /// Blocks the calling thread for the lifetime of the service.
    fn run<F>(self, configure: F) -> Self::Outcome
    where
        F: FnOnce(&mut Self::Configurator);
}
