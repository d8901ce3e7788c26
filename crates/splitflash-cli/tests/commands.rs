mod support;

use predicates::prelude::*;
use std::fs;

use support::{assert_timestamp_log_names, new_command_with_temp_home, write_config, write_firmware};

#[test]
fn root_help_lists_subcommands_and_flags() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: splitflash"))
        .stdout(predicate::str::contains("--diagnostics"))
        .stdout(predicate::str::contains("--base-dir"))
        .stdout(predicate::str::contains("--volume"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn doctor_help_runs_without_config() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["doctor", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Run environment and configuration checks",
        ));
}

#[test]
fn unknown_subcommands_are_rejected() {
    for subcommand in ["flash", "build"] {
        let (mut command, _temp_home) = new_command_with_temp_home();
        command
            .arg(subcommand)
            .assert()
            .failure()
            .stderr(predicate::str::contains("unrecognized subcommand"));
    }
}

#[test]
fn doctor_runs_without_config() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .arg("doctor")
        .arg("--base-dir")
        .arg(temp_home.path())
        .arg("--volume")
        .arg(temp_home.path().join("NICENANO"))
        .assert()
        .success()
        .stdout(predicate::str::contains("config is valid"))
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("no builds yet"))
        .stdout(predicate::str::contains("device volume mounted"))
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("failed"));
}

#[test]
fn doctor_reports_mounted_volume() {
    let (mut command, temp_home) = new_command_with_temp_home();
    let volume = temp_home.path().join("NICENANO");
    fs::create_dir(&volume).expect("mount");

    command
        .arg("doctor")
        .arg("--base-dir")
        .arg(temp_home.path())
        .arg("--volume")
        .arg(&volume)
        .assert()
        .success()
        .stdout(predicate::str::contains("mounted at"))
        .stdout(predicate::str::contains("not mounted").not());
}

#[test]
fn list_prints_builds_newest_first() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_firmware(
        temp_home.path(),
        "20240115",
        &["corne_left.uf2", "corne_right.uf2"],
        1024,
    );
    write_firmware(temp_home.path(), "20231201", &["settings_reset.uf2"], 512);

    let output = command
        .arg("list")
        .arg("--base-dir")
        .arg(temp_home.path())
        .output()
        .expect("run list");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("corne_left.uf2"), "{stdout}");
    assert!(stdout.contains("settings_reset.uf2"), "{stdout}");
    assert!(stdout.contains("2.0 KB"), "{stdout}");
    assert!(stdout.contains("512 B"), "{stdout}");

    let newest = stdout.find("2024-01-15").expect("newest build listed");
    let oldest = stdout.find("2023-12-01").expect("oldest build listed");
    assert!(newest < oldest, "{stdout}");
}

#[test]
fn list_without_firmware_directory_is_empty() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .arg("list")
        .arg("--base-dir")
        .arg(temp_home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No firmware builds in"));
}

#[test]
fn list_honors_configured_firmware_dir() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_config(
        temp_home.path(),
        "version = 1\n\n[firmware]\ndir = \"out\"\n",
    );
    let dir = temp_home.path().join("out").join("20240301");
    fs::create_dir_all(&dir).expect("build dir");
    fs::write(dir.join("corne_left.uf2"), b"uf2").expect("write firmware");

    command
        .arg("list")
        .arg("--base-dir")
        .arg(temp_home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-01"));
}

#[test]
fn invalid_config_fails_with_its_path() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_config(temp_home.path(), "version = 2\n");

    command
        .arg("list")
        .arg("--base-dir")
        .arg(temp_home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: invalid config at"))
        .stderr(predicate::str::contains(".config/splitflash/config.toml"));
}

#[test]
fn doctor_with_diagnostics_creates_log_file() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .args(["--diagnostics", "doctor", "--base-dir"])
        .arg(temp_home.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Diagnostics enabled:"));

    let diagnostics_dir = temp_home.path().join(".config/splitflash/diagnostics");
    let logs: Vec<_> = fs::read_dir(&diagnostics_dir)
        .expect("diagnostics dir")
        .filter_map(Result::ok)
        .collect();
    assert_timestamp_log_names(&logs);

    let contents = fs::read_to_string(logs[0].path()).expect("read log");
    assert!(contents.contains("splitflash diagnostics start"), "{contents}");
}

#[test]
fn no_diagnostics_directory_without_flag() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .arg("doctor")
        .arg("--base-dir")
        .arg(temp_home.path())
        .assert()
        .success();

    assert!(!temp_home.path().join(".config/splitflash/diagnostics").exists());
}
