//! CLI smoke tests for crossbuild.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn crossbuild() -> Command {
    cargo_bin_cmd!("crossbuild")
}

#[test]
fn lists_common_platforms() {
    crossbuild()
        .args(["platforms", "--shortcut", "common"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linux/amd64"))
        .stdout(predicate::str::contains("windows/arm/7"))
        .stdout(predicate::str::contains("darwin/arm64"));
}

#[test]
fn rejects_unknown_shortcut() {
    crossbuild()
        .args(["platforms", "--shortcut", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("common, native"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    crossbuild()
        .current_dir(dir.path())
        .args(["build", "--config", "nope.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn universal_off_darwin_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    crossbuild()
        .current_dir(dir.path())
        .args(["build", "-n", "app", "-p", "linux/universal"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("linux does not support universal arch"))
        .stdout(predicate::str::contains("Recovery suggestions"));
}

#[cfg(unix)]
#[test]
fn builds_with_stub_compiler() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("build"),
        "#!/bin/sh\nprintf 'bin' > \"$4\"\n",
    )
    .unwrap();

    crossbuild()
        .current_dir(dir.path())
        .args([
            "build",
            "--compiler",
            "sh",
            "-n",
            "tool",
            "-p",
            "linux/amd64",
            "-p",
            "windows/amd64",
            "--compress",
            "zip",
            "-o",
            "dist",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 2 artifact(s)"));

    assert!(dir.path().join("dist/tool-linux-amd64.zip").is_file());
    assert!(dir.path().join("dist/tool-windows-amd64.zip").is_file());
}
