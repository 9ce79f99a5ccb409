//! Scheduler detection integration tests.
//!
//! Detection is driven through scripted `which` probes, so the tests pass
//! on machines with any (or no) scheduler installed.

use batchq::{BatchError, ClientConfig, SchedulerKind, ScriptedRunner, detect};

#[test]
fn pbs_wins_when_qsub_is_present() {
    let runner = ScriptedRunner::new();
    runner.expect_stdout("which qsub", "/opt/pbs/default/bin/qsub");

    let client = detect(&runner, false, ClientConfig::default()).unwrap();
    assert_eq!(client.kind(), SchedulerKind::Pbs);
    assert!(runner.is_exhausted());
}

#[test]
fn slurm_wins_when_only_sbatch_is_present() {
    let runner = ScriptedRunner::new();
    runner.expect_failure("which qsub", 1, "");
    runner.expect_stdout("which sbatch", "/usr/bin/sbatch");

    let client = detect(&runner, false, ClientConfig::default()).unwrap();
    assert_eq!(client.kind(), SchedulerKind::Slurm);
}

#[test]
fn pbs_outranks_slurm() {
    // Both installed: probe order decides, and qsub is probed first.
    let runner = ScriptedRunner::new();
    runner.expect_stdout("which qsub", "/opt/pbs/default/bin/qsub");

    let client = detect(&runner, false, ClientConfig::default()).unwrap();
    assert_eq!(client.kind(), SchedulerKind::Pbs);
}

#[test]
fn bare_machine_yields_no_scheduler_detected() {
    let runner = ScriptedRunner::new();
    runner.expect_failure("which qsub", 1, "");
    runner.expect_failure("which sbatch", 1, "");

    let err = detect(&runner, false, ClientConfig::default()).err().unwrap();
    assert!(matches!(err, BatchError::NoSchedulerDetected));
}

#[test]
fn dev_mode_resolves_to_mock() {
    let runner = ScriptedRunner::new();
    runner.expect_stdout("which ls", "/bin/ls");

    let client = detect(&runner, true, ClientConfig::default()).unwrap();
    assert_eq!(client.kind(), SchedulerKind::Mock);
}

#[test]
fn dev_mode_probe_failure_falls_through() {
    let runner = ScriptedRunner::new();
    runner.expect_failure("which ls", 1, "");
    runner.expect_stdout("which qsub", "/opt/pbs/default/bin/qsub");

    let client = detect(&runner, true, ClientConfig::default()).unwrap();
    assert_eq!(client.kind(), SchedulerKind::Pbs);
}

#[test]
fn detected_mock_client_round_trips() {
    let runner = ScriptedRunner::new();
    runner.expect_stdout("which ls", "/bin/ls");
    let client = detect(&runner, true, ClientConfig::default()).unwrap();

    // The mock adapter shells out to echo for real.
    let submission = client
        .submit("test.sh", batchq::SubmitOptions::new().with_dry_run(true))
        .unwrap();
    assert_eq!(submission.command(), Some("echo test.sh"));
}
