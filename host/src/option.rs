//! Service configuration model.
//!
//! A [`ServiceOption`] describes how a service identifies itself to the
//! service manager. It carries no behavior of its own: validation happens in
//! the runner before the host is touched.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// When the service manager starts the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPattern {
    /// Start at boot
    Automatically,
    /// Start at boot, after the other automatic services
    AutomaticallyDelayed,
    /// Start only on request
    Manually,
}

impl StartPattern {
    pub const ALL: [StartPattern; 3] = [
        StartPattern::Automatically,
        StartPattern::AutomaticallyDelayed,
        StartPattern::Manually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StartPattern::Automatically => "automatically",
            StartPattern::AutomaticallyDelayed => "automatically-delayed",
            StartPattern::Manually => "manually",
        }
    }
}

impl fmt::Display for StartPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartPattern {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown start pattern '{}'", s))
    }
}

/// Account the service process runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunAs {
    /// Built-in Local Service account
    LocalService,
    /// Built-in Local System account
    LocalSystem,
    /// Built-in Network Service account
    NetworkService,
    /// Ask for credentials at install time
    Prompt,
}

impl RunAs {
    pub const ALL: [RunAs; 4] = [
        RunAs::LocalService,
        RunAs::LocalSystem,
        RunAs::NetworkService,
        RunAs::Prompt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunAs::LocalService => "local-service",
            RunAs::LocalSystem => "local-system",
            RunAs::NetworkService => "network-service",
            RunAs::Prompt => "prompt",
        }
    }
}

impl fmt::Display for RunAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunAs {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown run-as account '{}'", s))
    }
}

/// How the display name registered with the host is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayNamePolicy {
    /// A non-empty display name is replaced by the service name; an empty
    /// one is never registered. Matches the historical behavior of hosts
    /// built on this adapter.
    #[default]
    Legacy,
    /// Use the display name when present, otherwise the service name.
    Fallback,
}

/// Service identity and registration settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ServiceOption {
    /// Registration key with the service manager
    #[serde(rename = "name")]
    pub service_name: String,
    /// Human readable name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Description shown by the service manager
    #[serde(default)]
    pub description: Option<String>,
    /// Start behavior; `None` keeps the manager's default
    #[serde(default, deserialize_with = "lenient")]
    pub start_pattern: Option<StartPattern>,
    /// Account; `None` keeps the manager's default
    #[serde(default, deserialize_with = "lenient")]
    pub run_as: Option<RunAs>,
    #[serde(default)]
    pub display_name_policy: DisplayNamePolicy,
}

impl ServiceOption {
    /// Create an option with only the service name set.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_start_pattern(mut self, start_pattern: StartPattern) -> Self {
        self.start_pattern = Some(start_pattern);
        self
    }

    pub fn with_run_as(mut self, run_as: RunAs) -> Self {
        self.run_as = Some(run_as);
        self
    }

    pub fn with_display_name_policy(mut self, policy: DisplayNamePolicy) -> Self {
        self.display_name_policy = policy;
        self
    }
}

/// Parse an enum from its string form. Unknown strings and values of any
/// other type map to `None`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw: Option<toml::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let parsed = match &value {
            toml::Value::String(s) => s.parse(),
            other => Err(format!("expected a string, found {}", other.type_str())),
        };
        match parsed {
            Ok(setting) => Some(setting),
            Err(reason) => {
                warn!(%value, %reason, "Ignoring unrecognized setting, manager default applies");
                None
            }
        }
    }))
}
