//! TOML host configuration loader.
//!
//! ```toml
//! [service]
//! name = "svc1"
//! display_name = "Service One"
//! start_pattern = "automatically-delayed"
//! run_as = "local-system"
//!
//! [recovery]
//! reset_period_days = 1
//!
//! [[recovery.actions]]
//! type = "restart-service"
//! delay_minutes = 1
//! ```

use crate::error::{Error, Result};
use crate::option::ServiceOption;
use crate::recovery::{RecoveryCallback, RecoveryPolicy};
use crate::runner;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Environment variable naming the default config file
pub const CONFIG_ENV: &str = "WARDEN_CONFIG";

/// Contents of a host config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Service identity; required to run
    #[serde(default)]
    pub service: Option<ServiceOption>,
    /// Crash recovery; omitted means recovery is not configured
    #[serde(default)]
    pub recovery: Option<RecoveryPolicy>,
}

impl HostConfig {
    /// Parse a config from TOML text. `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The validated service option.
    pub fn service_option(&self) -> Result<&ServiceOption> {
        runner::validate(self.service.as_ref())
    }

    /// Recovery policy as a host callback, if one is configured.
    pub fn recovery_callback(&self) -> Option<RecoveryCallback> {
        self.recovery.clone().map(RecoveryPolicy::into_callback)
    }
}

/// Load and parse a config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<HostConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let config = HostConfig::parse(&content, path)?;
    debug!(path = %path.display(), service = ?config.service.as_ref().map(|s| &s.service_name), "Loaded host config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{RunAs, StartPattern};
    use crate::recovery::{RecoveryAction, RecoveryConfigurator};
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<HostConfig> {
        HostConfig::parse(content, &PathBuf::from("test.toml"))
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
            [service]
            name = "svc1"
            display_name = "Service One"
            description = "Example"
            start_pattern = "automatically-delayed"
            run_as = "local-system"
            display_name_policy = "fallback"

            [recovery]
            reset_period_days = 1
            on_crash_only = true

            [[recovery.actions]]
            type = "restart-service"
            delay_minutes = 1

            [[recovery.actions]]
            type = "run-program"
            delay_minutes = 2
            command = "alert.sh"
            "#,
        )
        .unwrap();

        let option = config.service_option().unwrap();
        assert_eq!(option.service_name, "svc1");
        assert_eq!(option.start_pattern, Some(StartPattern::AutomaticallyDelayed));
        assert_eq!(option.run_as, Some(RunAs::LocalSystem));

        let policy = config.recovery.as_ref().unwrap();
        assert_eq!(policy.actions.len(), 2);
        assert_eq!(
            policy.actions[1],
            RecoveryAction::RunProgram {
                delay_minutes: 2,
                command: "alert.sh".to_string()
            }
        );

        let mut recovery = RecoveryConfigurator::new();
        (config.recovery_callback().unwrap())(&mut recovery);
        assert_eq!(recovery.reset_period_days(), Some(1));
        assert!(recovery.is_crash_only());
    }

    #[test]
    fn test_missing_service_table() {
        let config = parse("").unwrap();
        let err = config.service_option().unwrap_err();
        assert!(err.is_configuration());
        assert!(config.recovery_callback().is_none());
    }

    #[test]
    fn test_empty_service_name() {
        let config = parse("[service]\nname = \"\"\n").unwrap();
        assert!(config.service_option().unwrap_err().is_configuration());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse("[service\nname = 1").unwrap_err();
        assert!(matches!(err, Error::Toml { .. }));
        assert!(err.to_string().contains("test.toml"));
    }
}
