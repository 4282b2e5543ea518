//! End-to-end tests for the warden binary

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[service]
name = "svc1"
display_name = "Service One"
description = "Example service"
start_pattern = "automatically-delayed"
run_as = "local-system"

[recovery]
reset_period_days = 1

[[recovery.actions]]
type = "restart-service"
delay_minutes = 1
"#;

/// Write `content` to a config file in a fresh temp dir
fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("service.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

fn warden() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_warden"));
    cmd.env_remove("WARDEN_CONFIG").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_validate_accepts_full_config() {
    let (_dir, path) = write_config(FULL_CONFIG);
    let output = warden()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("service 'svc1' is valid"));
}

#[test]
fn test_validate_rejects_empty_name() {
    let (_dir, path) = write_config("[service]\nname = \"\"\n");
    let output = warden()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("service_name"));
}

#[test]
fn test_config_from_environment() {
    let (_dir, path) = write_config(FULL_CONFIG);
    let output = warden()
        .env("WARDEN_CONFIG", &path)
        .arg("validate")
        .output()
        .unwrap();

    assert!(output.status.success());
}

#[test]
fn test_plan_prints_registrations_in_order() {
    let (_dir, path) = write_config(FULL_CONFIG);
    let output = warden()
        .arg("--config")
        .arg(&path)
        .arg("plan")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().map(str::trim).collect();
    assert_eq!(
        &lines[..6],
        &[
            "Service: svc1",
            "run as Local System",
            "description: Example service",
            "display name: svc1",
            "service name: svc1",
            "start automatically (delayed)",
        ]
    );
    assert!(stdout.contains("Recovery:"));
}

#[test]
fn test_run_exits_with_service_result() {
    let (_dir, path) = write_config("[service]\nname = \"short\"\n");
    let output = warden()
        .arg("--config")
        .arg(&path)
        .args(["run", "--", "/nonexistent/warden-test-binary"])
        .output()
        .unwrap();

    // The program cannot be spawned, so the start callback fails with 1064,
    // which Unix truncates to its low byte.
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1064 & 0xff));
}

#[test]
fn test_run_reports_program_exit() {
    let (_dir, path) = write_config("[service]\nname = \"short\"\n");
    let output = warden()
        .arg("--config")
        .arg(&path)
        .args(["run", "--", "sh", "-c", "exit 3"])
        .output()
        .unwrap();

    // The program ended without a stop request: 1067, truncated by Unix.
    assert_eq!(output.status.code(), Some(1067 & 0xff));
}

#[test]
fn test_run_program_finishing_cleanly_still_ends_service() {
    let (_dir, path) = write_config("[service]\nname = \"short\"\n");
    let output = warden()
        .arg("--config")
        .arg(&path)
        .args(["run", "--", "sh", "-c", "exit 0"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1067 & 0xff));
}
