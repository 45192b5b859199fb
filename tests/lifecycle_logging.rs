//! Lifecycle hooks driven end to end against captured log output.

use server_launch::config::loader::{load_config_with, PORT_ENV, WEB_CONCURRENCY_ENV};
use server_launch::lifecycle::{Lifecycle, WorkerHandle};

mod common;

use common::{capture_logs, env_of};

#[test]
fn test_web_concurrency_capacity_message() {
    let config = load_config_with(None, 2, env_of(&[(WEB_CONCURRENCY_ENV, "3")])).unwrap();
    assert_eq!(config.workers.workers, 3);
    assert_eq!(config.server.bind, "0.0.0.0:5000");

    let mut lifecycle = Lifecycle::new(&config);
    let logs = capture_logs(|| lifecycle.starting().unwrap());

    let info = logs.at_level("INFO");
    assert_eq!(info.len(), 1, "expected one capacity line, got {info:?}");
    assert!(info[0].contains("Workers: 3, Threads: 4, Capacity: 12 concurrent requests"));
    assert!(info[0].contains("Starting sdg-assessment (production)"));
}

#[test]
fn test_two_cpu_host_without_overrides() {
    let config = load_config_with(None, 2, env_of(&[])).unwrap();
    assert_eq!(config.workers.workers, 4);
    assert_eq!(config.capacity(), 16);

    let mut lifecycle = Lifecycle::new(&config);
    let logs = capture_logs(|| lifecycle.starting().unwrap());
    assert!(logs.lines()[0].contains("Capacity: 16 concurrent requests"));
}

#[test]
fn test_worker_timeout_logs_one_error() {
    let config = load_config_with(None, 2, env_of(&[(PORT_ENV, "8000")])).unwrap();
    let mut lifecycle = Lifecycle::new(&config);

    let logs = capture_logs(|| {
        lifecycle.starting().unwrap();
        lifecycle.ready().unwrap();
        lifecycle
            .worker_timed_out(&WorkerHandle { pid: 4242, age: 1 })
            .unwrap();
    });

    let errors = logs.at_level("ERROR");
    assert_eq!(errors.len(), 1, "expected one error line, got {errors:?}");
    assert!(errors[0].contains("Worker 4242 timeout - aborting"));
}

#[test]
fn test_ready_and_exit_lines() {
    let config = load_config_with(None, 2, env_of(&[])).unwrap();
    let mut lifecycle = Lifecycle::new(&config);

    let logs = capture_logs(|| {
        lifecycle.starting().unwrap();
        lifecycle.ready().unwrap();
        lifecycle.exiting().unwrap();
    });

    let info = logs.at_level("INFO");
    assert_eq!(info.len(), 3);
    assert!(info[1].contains("Server ready"));
    assert!(info[2].contains("Server shutting down"));
}

#[test]
fn test_second_ready_rejected_and_warned() {
    let config = load_config_with(None, 2, env_of(&[])).unwrap();
    let mut lifecycle = Lifecycle::new(&config);

    let logs = capture_logs(|| {
        lifecycle.starting().unwrap();
        lifecycle.ready().unwrap();
        assert!(lifecycle.ready().is_err());
    });

    let ready = logs
        .lines()
        .into_iter()
        .filter(|line| line.contains("Server ready"))
        .count();
    assert_eq!(ready, 1);
    assert_eq!(logs.at_level("WARN").len(), 1);
}
