//! Run orchestrator.
//!
//! Validates the service option, wires a fresh service instance into the
//! host, applies the registration mapping and turns the host's result into
//! the process exit code.

use crate::diagnostics::{DiagnosticsPort, ProcessDebugger};
use crate::error::{Error, Result};
use crate::exit::{self, RunOutcome};
use crate::host::{HostConfigurator, ServiceHost};
use crate::lifecycle::{HostedService, LifecycleAdapter};
use crate::option::ServiceOption;
use crate::recovery::RecoveryCallback;
use crate::registration;
use std::marker::PhantomData;
use tracing::{debug, info};

/// Check an option before anything is registered with the host.
pub fn validate(option: Option<&ServiceOption>) -> Result<&ServiceOption> {
    let option = option.ok_or_else(|| Error::missing("option"))?;
    if option.service_name.is_empty() {
        return Err(Error::missing("service_name"));
    }
    Ok(option)
}

/// Builder for one run of a service of type `S`.
///
/// ```rust,no_run
/// use warden_host::{ConsoleHost, HostedService, ServiceOption, ServiceRunner};
///
/// #[derive(Default)]
/// struct Worker;
///
/// impl HostedService for Worker {
///     fn start(&mut self, _args: &[String], _option: &ServiceOption) -> anyhow::Result<()> {
///         Ok(())
///     }
///     fn stop(&mut self) -> anyhow::Result<()> {
///         Ok(())
///     }
///     fn paused(&mut self) -> anyhow::Result<()> {
///         Ok(())
///     }
///     fn continued(&mut self) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let (host, _control) = ConsoleHost::new();
/// let code = ServiceRunner::<Worker>::new(ServiceOption::new("worker"))
///     .recovery(|r| {
///         r.restart_service(1);
///     })
///     .run(host, std::env::args().collect())?;
/// # Ok::<(), warden_host::Error>(())
/// ```
pub struct ServiceRunner<S, D = ProcessDebugger> {
    option: Option<ServiceOption>,
    recovery: Option<RecoveryCallback>,
    debug: bool,
    diagnostics: D,
    _service: PhantomData<fn() -> S>,
}

impl<S> ServiceRunner<S, ProcessDebugger>
where
    S: HostedService + Default,
{
    pub fn new(option: impl Into<Option<ServiceOption>>) -> Self {
        Self {
            option: option.into(),
            recovery: None,
            debug: false,
            diagnostics: ProcessDebugger,
            _service: PhantomData,
        }
    }
}

impl<S, D> ServiceRunner<S, D>
where
    S: HostedService + Default,
    D: DiagnosticsPort + 'static,
{
    /// Configure crash recovery on the host
    pub fn recovery<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut crate::recovery::RecoveryConfigurator) + Send + 'static,
    {
        self.recovery = Some(Box::new(configure));
        self
    }

    /// Configure crash recovery from an already boxed callback
    pub fn recovery_callback(mut self, configure: Option<RecoveryCallback>) -> Self {
        self.recovery = configure;
        self
    }

    /// Break into a debugger before the service starts
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replace the debugger facility used by the debug gate
    pub fn diagnostics<P>(self, diagnostics: P) -> ServiceRunner<S, P>
    where
        P: DiagnosticsPort + 'static,
    {
        ServiceRunner {
            option: self.option,
            recovery: self.recovery,
            debug: self.debug,
            diagnostics,
            _service: PhantomData,
        }
    }

    /// Run the service under `host` until the host loop returns.
    ///
    /// Returns the process exit code, which is also recorded with
    /// [`exit::set_exit_code`]. Fails only on invalid configuration, in
    /// which case the host is never touched.
    pub fn run<H>(self, host: H, args: Vec<String>) -> Result<i32>
    where
        H: ServiceHost,
    {
        let ServiceRunner {
            option,
            recovery,
            debug: debug_enabled,
            diagnostics,
            ..
        } = self;

        let option = validate(option.as_ref())?.clone();
        let service_name = option.service_name.clone();
        info!(service = %service_name, debug_enabled, "Starting service host");

        let outcome = host.run(move |cfg| {
            let adapter = LifecycleAdapter::new(S::default(), args, option.clone(), diagnostics)
                .with_debug(debug_enabled);
            cfg.service(Box::new(adapter));
            configure(cfg, &option, recovery);
        });

        let code = outcome.exit_code();
        exit::set_exit_code(code);
        info!(service = %service_name, exit_code = code, "Service host exited");
        Ok(code)
    }
}

/// Registration order: account, recovery, metadata, start pattern.
fn configure<C>(cfg: &mut C, option: &ServiceOption, recovery: Option<RecoveryCallback>)
where
    C: HostConfigurator + ?Sized,
{
    registration::apply_all(cfg, registration::run_as(option).iter());
    if let Some(recovery) = recovery {
        debug!(service = %option.service_name, "Enabling service recovery");
        cfg.enable_service_recovery(recovery);
    }
    registration::apply_all(cfg, &registration::metadata(option));
    registration::apply_all(cfg, registration::start_pattern(option).iter());
}

/// Run service `S` under `host`.
///
/// Shorthand for [`ServiceRunner`] with the process debugger.
pub fn run<S, H>(
    host: H,
    args: Vec<String>,
    option: Option<ServiceOption>,
    recovery: Option<RecoveryCallback>,
    debug: bool,
) -> Result<i32>
where
    S: HostedService + Default,
    H: ServiceHost,
{
    ServiceRunner::<S>::new(option)
        .recovery_callback(recovery)
        .debug(debug)
        .run(host, args)
}
