//! Tests for loading host config files from disk

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use warden_host::{load_config, Error, RecoveryAction, RunAs, StartPattern};

/// Write a config file into a temporary directory
fn create_test_config(content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("service.toml");
    fs::write(&path, content).expect("Failed to write config");
    (path, temp_dir)
}

mod load {
    use super::*;

    #[test]
    fn test_load_full_config() {
        let (path, _temp_dir) = create_test_config(
            r#"
            [service]
            name = "svc1"
            description = "Example service"
            start_pattern = "manually"
            run_as = "local-service"

            [recovery]
            reset_period_days = 3

            [[recovery.actions]]
            type = "restart-computer"
            delay_minutes = 10
            message = "rebooting"
            "#,
        );

        let config = load_config(&path).unwrap();
        let option = config.service_option().unwrap();
        assert_eq!(option.service_name, "svc1");
        assert_eq!(option.description.as_deref(), Some("Example service"));
        assert_eq!(option.start_pattern, Some(StartPattern::Manually));
        assert_eq!(option.run_as, Some(RunAs::LocalService));

        let policy = config.recovery.as_ref().unwrap();
        assert_eq!(policy.reset_period_days, Some(3));
        assert_eq!(
            policy.actions,
            vec![RecoveryAction::RestartComputer {
                delay_minutes: 10,
                message: "rebooting".to_string()
            }]
        );
    }

    #[test]
    fn test_load_empty_file() {
        let (path, _temp_dir) = create_test_config("");
        let config = load_config(&path).unwrap();
        assert!(config.service.is_none());
        assert!(config.service_option().unwrap_err().is_configuration());
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = load_config(temp_dir.path().join("absent.toml")).unwrap_err();

        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let (path, _temp_dir) = create_test_config("[service\nname = \"svc1\"\n");
        let err = load_config(&path).unwrap_err();

        assert!(matches!(err, Error::Toml { .. }));
        assert!(err.to_string().contains("service.toml"));
    }

    #[test]
    fn test_non_string_setting_is_ignored() {
        let (path, _temp_dir) =
            create_test_config("[service]\nname = \"svc1\"\nstart_pattern = 99\nrun_as = true\n");

        let config = load_config(&path).unwrap();
        let option = config.service_option().unwrap();
        assert_eq!(option.start_pattern, None);
        assert_eq!(option.run_as, None);
    }
}
