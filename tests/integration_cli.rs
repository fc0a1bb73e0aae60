// Process-level checks that need no TTY: help/version output and the
// startup guard for non-interactive stdin.

use assert_cmd::cargo::cargo_bin;
use std::process::Command;

#[test]
fn help_documents_the_data_flag() {
    let output = Command::new(cargo_bin("klok"))
        .arg("--help")
        .output()
        .expect("failed to run klok --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--data"));
    assert!(stdout.contains("session log"));
}

#[test]
fn version_flag_reports_the_crate_version() {
    let output = Command::new(cargo_bin("klok"))
        .arg("--version")
        .output()
        .expect("failed to run klok --version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn refuses_to_start_without_a_tty() {
    // The spawned process gets piped stdio, so the tty guard must trip
    // before the alternate screen is ever entered
    let output = Command::new(cargo_bin("klok"))
        .output()
        .expect("failed to run klok");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stdin must be a tty"));
}
