//! Mapping from service options to host registration calls.
//!
//! Start pattern and run-as account each map to exactly one
//! [`Registration`]; an unset value maps to none and the host keeps its own
//! default.

use crate::host::HostConfigurator;
use crate::option::{DisplayNamePolicy, RunAs, ServiceOption, StartPattern};
use std::fmt;

/// One registration call on a [`HostConfigurator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Registration {
    StartAutomatically,
    StartAutomaticallyDelayed,
    StartManually,
    RunAsLocalService,
    RunAsLocalSystem,
    RunAsNetworkService,
    RunAsPrompt,
    SetDescription(String),
    SetDisplayName(String),
    SetServiceName(String),
}

impl Registration {
    /// Perform the call on the host.
    pub fn apply<H>(&self, host: &mut H)
    where
        H: HostConfigurator + ?Sized,
    {
        match self {
            Registration::StartAutomatically => host.start_automatically(),
            Registration::StartAutomaticallyDelayed => host.start_automatically_delayed(),
            Registration::StartManually => host.start_manually(),
            Registration::RunAsLocalService => host.run_as_local_service(),
            Registration::RunAsLocalSystem => host.run_as_local_system(),
            Registration::RunAsNetworkService => host.run_as_network_service(),
            Registration::RunAsPrompt => host.run_as_prompt(),
            Registration::SetDescription(description) => host.set_description(description),
            Registration::SetDisplayName(display_name) => host.set_display_name(display_name),
            Registration::SetServiceName(service_name) => host.set_service_name(service_name),
        }
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::StartAutomatically => write!(f, "start automatically"),
            Registration::StartAutomaticallyDelayed => write!(f, "start automatically (delayed)"),
            Registration::StartManually => write!(f, "start manually"),
            Registration::RunAsLocalService => write!(f, "run as Local Service"),
            Registration::RunAsLocalSystem => write!(f, "run as Local System"),
            Registration::RunAsNetworkService => write!(f, "run as Network Service"),
            Registration::RunAsPrompt => write!(f, "prompt for credentials at install"),
            Registration::SetDescription(d) => write!(f, "description: {}", d),
            Registration::SetDisplayName(d) => write!(f, "display name: {}", d),
            Registration::SetServiceName(s) => write!(f, "service name: {}", s),
        }
    }
}

impl StartPattern {
    pub fn registration(self) -> Registration {
        match self {
            StartPattern::Automatically => Registration::StartAutomatically,
            StartPattern::AutomaticallyDelayed => Registration::StartAutomaticallyDelayed,
            StartPattern::Manually => Registration::StartManually,
        }
    }
}

impl RunAs {
    pub fn registration(self) -> Registration {
        match self {
            RunAs::LocalService => Registration::RunAsLocalService,
            RunAs::LocalSystem => Registration::RunAsLocalSystem,
            RunAs::NetworkService => Registration::RunAsNetworkService,
            RunAs::Prompt => Registration::RunAsPrompt,
        }
    }
}

/// Registration for the start pattern, if one is set.
pub fn start_pattern(option: &ServiceOption) -> Option<Registration> {
    option.start_pattern.map(StartPattern::registration)
}

/// Registration for the run-as account, if one is set.
pub fn run_as(option: &ServiceOption) -> Option<Registration> {
    option.run_as.map(RunAs::registration)
}

/// Display name to register, or `None` to leave the host default.
pub fn resolve_display_name(option: &ServiceOption) -> Option<String> {
    let display_name = option.display_name.as_deref().filter(|d| !d.is_empty());

    match option.display_name_policy {
        // Long-standing behavior: a supplied display name is swapped for the
        // service name, and a missing one is never registered.
        DisplayNamePolicy::Legacy => display_name.map(|_| option.service_name.clone()),
        DisplayNamePolicy::Fallback => Some(
            display_name
                .unwrap_or(option.service_name.as_str())
                .to_string(),
        ),
    }
}

/// Description, display name and service name, in that order.
pub fn metadata(option: &ServiceOption) -> Vec<Registration> {
    let mut calls = Vec::with_capacity(3);

    if let Some(description) = option.description.as_deref().filter(|d| !d.is_empty()) {
        calls.push(Registration::SetDescription(description.to_string()));
    }
    if let Some(display_name) = resolve_display_name(option) {
        calls.push(Registration::SetDisplayName(display_name));
    }
    calls.push(Registration::SetServiceName(option.service_name.clone()));

    calls
}

/// Every option-driven registration, in the order the runner applies them.
pub fn plan(option: &ServiceOption) -> Vec<Registration> {
    run_as(option)
        .into_iter()
        .chain(metadata(option))
        .chain(start_pattern(option))
        .collect()
}

/// Apply a sequence of registrations to a host.
pub fn apply_all<'a, H, I>(host: &mut H, registrations: I)
where
    H: HostConfigurator + ?Sized,
    I: IntoIterator<Item = &'a Registration>,
{
    for registration in registrations {
        registration.apply(host);
    }
}
