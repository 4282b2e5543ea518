//! # Warden service host adapter
//!
//! Runs an application-defined service under a service manager without the
//! service knowing the manager's registration, lifecycle or recovery APIs.
//!
//! ## Architecture
//!
//! - **Configuration**: [`ServiceOption`] and the TOML [`loader`]
//! - **Lifecycle**: [`LifecycleAdapter`] binds a [`HostedService`] to host events
//! - **Registration**: [`registration`] maps options to [`HostConfigurator`] calls
//! - **Runner**: [`ServiceRunner`] / [`run`] validate, wire, run and report the exit code
//! - **Hosts**: the [`ServiceHost`] trait and the in-process [`ConsoleHost`]

pub mod console;
pub mod diagnostics;
pub mod error;
pub mod exit;
pub mod host;
pub mod lifecycle;
pub mod loader;
pub mod option;
pub mod recovery;
pub mod registration;
pub mod runner;

pub use console::{ConsoleExit, ConsoleHost, ControlHandle, ControlRequest, HostSettings};
pub use diagnostics::{DiagnosticsPort, NoDebugger, ProcessDebugger};
pub use error::{Error, Result};
pub use exit::{ExitCodeRepr, RunOutcome};
pub use host::{HostConfigurator, ServiceHost};
pub use lifecycle::{HostedService, LifecycleAdapter, LifecycleEvent, LifecycleState, ServiceControl};
pub use loader::{load_config, HostConfig};
pub use option::{DisplayNamePolicy, RunAs, ServiceOption, StartPattern};
pub use recovery::{RecoveryAction, RecoveryCallback, RecoveryConfigurator, RecoveryPolicy};
pub use registration::Registration;
pub use runner::{run, ServiceRunner};
