//! The runner records the exit code for the process. Kept in its own test
//! binary because the recorded status is process-wide.

mod common;

use common::{NoopService, RecordingHost};
use warden_host::{exit, run, ServiceOption};

#[test]
fn test_run_records_process_exit_code() {
    assert_eq!(exit::exit_code(), 0);

    let host = RecordingHost::new(42i32);
    let code = run::<NoopService, _>(host, Vec::new(), Some(ServiceOption::new("svc1")), None, false)
        .unwrap();
    assert_eq!(code, 42);
    assert_eq!(exit::exit_code(), 42);

    // A rejected configuration leaves the recorded status alone.
    let host = RecordingHost::new(7i32);
    assert!(run::<NoopService, _>(host, Vec::new(), Some(ServiceOption::new("")), None, false).is_err());
    assert_eq!(exit::exit_code(), 42);
}
