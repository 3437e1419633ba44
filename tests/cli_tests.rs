#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::TempDir;

fn run_cli(dir: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    let db_path = dir.path().join("cli-tasks.db");
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("QUARTERLY_TASKS_DB", db_path)
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_creates_and_lists_schedulers() {
    let dir = TempDir::new().expect("create temp dir");
    run_cli(
        &dir,
        "scheduler weekly 1 6 Water plants\nscheduler list 1\nquit\n",
    )
    .success()
    .stdout(str_contains("Created scheduler 1 (Water plants (every Sunday))"))
    .stdout(str_contains("1 schedulers."));
}

#[test]
fn cli_apply_reports_dates_and_rejects_duplicates() {
    let dir = TempDir::new().expect("create temp dir");
    let assert = run_cli(
        &dir,
        "scheduler weekly 1 6 Water plants\napply 1 Q1 2024\napply 1 Q1 2024\nquit\n",
    )
    .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("13 tasks"), "expected 13 tasks:\n{output}");
    assert!(output.contains("2024-01-07"), "first Sunday missing:\n{output}");
    assert!(
        output.contains("already applied"),
        "duplicate apply should be rejected:\n{output}"
    );
}

#[test]
fn cli_revoke_keeps_tasks() {
    let dir = TempDir::new().expect("create temp dir");
    let assert = run_cli(
        &dir,
        "scheduler monthly 2 15 Pay rent\napply 1 Q2 2024\nrevoke 1\ntasks 2\nquit\n",
    )
    .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Application 1 revoked"), "{output}");
    // Three monthly tasks remain listed after the revoke.
    assert!(output.contains("2024-04-15"), "{output}");
    assert!(output.contains("2024-05-15"), "{output}");
    assert!(output.contains("2024-06-15"), "{output}");
}

#[test]
fn cli_updates_task_status() {
    let dir = TempDir::new().expect("create temp dir");
    run_cli(
        &dir,
        "scheduler monthly 3 1 Pay rent\napply 1 Q1 2024\nstatus 1 completed\ntasks 3 pending\nquit\n",
    )
    .success()
    .stdout(str_contains("Task 1 is now completed."));
}

#[test]
fn cli_preview_does_not_touch_the_store() {
    let dir = TempDir::new().expect("create temp dir");
    run_cli(&dir, "preview monthly 15 2024 Q2\ntasks 1\nquit\n")
        .success()
        .stdout(str_contains("2024-05-15"))
        .stdout(str_contains("3 dates."));
}

#[test]
fn cli_rejects_invalid_preview_input() {
    let dir = TempDir::new().expect("create temp dir");
    run_cli(&dir, "preview monthly 31 2024 Q2\nquit\n")
        .success()
        .stdout(str_contains("day_of_month"));
}

#[test]
fn cli_export_and_import_round_trip() {
    let dir = TempDir::new().expect("create temp dir");
    let export_path = dir.path().join("tasks.json");
    let script = format!(
        "scheduler monthly 4 1 Pay rent\napply 1 Q1 2024\nexport json 4 {}\nimport json {}\nquit\n",
        export_path.display(),
        export_path.display()
    );
    run_cli(&dir, &script)
        .success()
        .stdout(str_contains("3 tasks exported"))
        .stdout(str_contains("Imported 3 tasks"));
}

#[test]
fn cli_reports_unknown_commands() {
    let dir = TempDir::new().expect("create temp dir");
    run_cli(&dir, "frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command."));
}
