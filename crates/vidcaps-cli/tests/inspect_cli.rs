// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// vidcaps CLI - Inspection Run Tests
//
// TESTING LAYERS:
//
// Layer 1 (No hardware required):
//   - Fatal precondition handling (backend missing from PATH)
//   - Empty and imposter-only device roots
//   - Full report shape against synthetic device roots and a scripted
//     fake v4l2-ctl on a private PATH
//   - Snapshot JSON structure
//
// Layer 3 (Hardware Integration - Requires V4L2 devices and v4l-utils):
//   - Inspection of the real /dev namespace
//
// RUN LAYER 1:
//   cargo test --test inspect_cli
//
// RUN LAYER 3 (on hardware):
//   cargo test --test inspect_cli -- --ignored --nocapture

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::io::Write as _;
use std::os::unix::fs::{symlink, OpenOptionsExt};
use std::path::Path;

/// Helper to create a Command for the vidcaps binary
fn vidcaps_cmd() -> Command {
    Command::cargo_bin("vidcaps").expect("vidcaps binary should build")
}

/// Write an executable fake v4l2-ctl script into `dir`
fn fake_backend(dir: &Path, script: &str) {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o755)
        .open(dir.join("v4l2-ctl"))
        .unwrap();
    file.write_all(script.as_bytes()).unwrap();
}

/// Synthetic device root with the given `video*` symlinks to /dev/null
fn fake_dev_root(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        symlink("/dev/null", dir.path().join(name)).unwrap();
    }
    dir
}

const ALL_LABEL: &str = ">>> BASIC INFORMATION AND CAPABILITIES (v4l2-ctl --all)";
const FORMATS_LABEL: &str = ">>> SUPPORTED FORMATS AND RESOLUTIONS (v4l2-ctl --list-formats-ext)";

// =============================================================================
// Layer 1: Fatal Precondition (Backend Missing)
// =============================================================================

#[test]
fn test_inspect_backend_missing_is_fatal() {
    let empty_path = tempfile::tempdir().unwrap();
    let dev_root = fake_dev_root(&["video0"]);

    vidcaps_cmd()
        .env("PATH", empty_path.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("v4l2-ctl"))
        .stderr(predicate::str::contains("v4l-utils"))
        .stdout(predicate::str::contains("DEVICE:").not())
        .stdout(predicate::str::contains("Discovered").not());
}

#[test]
fn test_snapshot_backend_missing_is_fatal() {
    let empty_path = tempfile::tempdir().unwrap();
    let dev_root = fake_dev_root(&[]);

    vidcaps_cmd()
        .env("PATH", empty_path.path())
        .args(["snapshot", "--dev-root"])
        .arg(dev_root.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("v4l-utils"));
}

// =============================================================================
// Layer 1: Empty Device Roots
// =============================================================================

#[test]
fn test_inspect_no_name_matches() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\nexit 0\n");
    let dev_root = tempfile::tempdir().unwrap();

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout
            .matches("Is a camera connected and recognized?")
            .count(),
        1
    );
    assert!(!stdout.contains("DEVICE:"));
}

#[test]
fn test_inspect_matches_but_no_char_devices() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\nexit 0\n");
    let dev_root = tempfile::tempdir().unwrap();
    fs::write(dev_root.path().join("video0"), b"imposter").unwrap();

    vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No character-device video* nodes found",
        ))
        .stdout(predicate::str::contains("DEVICE:").not());
}

// =============================================================================
// Layer 1: Report Shape
// =============================================================================

#[test]
fn test_inspect_reports_each_device_with_both_sections() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\necho \"mode $3 for $2\"\n");
    let dev_root = fake_dev_root(&["video0", "video1"]);

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert_eq!(stdout.matches("DEVICE: ").count(), 2);
    assert_eq!(stdout.matches(ALL_LABEL).count(), 2);
    assert_eq!(stdout.matches(FORMATS_LABEL).count(), 2);

    // Discovery order is lexical and the banners follow it.
    let video0 = stdout.find("DEVICE: ").unwrap();
    let video1 = stdout.rfind("DEVICE: ").unwrap();
    assert!(stdout[video0..video1].contains("video0"));
    assert!(stdout[video1..].contains("video1"));

    // The 80-character rule delimits each banner.
    let rule = "=".repeat(80);
    assert_eq!(stdout.matches(&rule).count(), 4);

    // Backend output was passed through verbatim.
    assert!(stdout.contains("mode --all"));
    assert!(stdout.contains("mode --list-formats-ext"));
}

#[test]
fn test_inspect_regular_file_never_gets_a_banner() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\necho \"capability text\"\n");
    let dev_root = fake_dev_root(&["video0"]);
    fs::write(dev_root.path().join("video1"), b"imposter").unwrap();

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert_eq!(stdout.matches("DEVICE: ").count(), 1);
    assert!(stdout.contains("video0"));
    assert!(!stdout.contains("video1"));
}

#[test]
fn test_inspect_silent_backend_emits_no_output_marker() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\nexit 0\n");
    let dev_root = fake_dev_root(&["video0"]);

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("(no output)").count(), 2);
}

#[test]
fn test_inspect_query_failure_does_not_abort_run() {
    let tool_dir = tempfile::tempdir().unwrap();
    // Fails for video0, succeeds for anything else.
    fake_backend(
        tool_dir.path(),
        concat!(
            "#!/bin/sh\n",
            "case \"$2\" in\n",
            "*video0) echo \"cannot open\" >&2; exit 1 ;;\n",
            "*) echo \"capability text\" ;;\n",
            "esac\n",
        ),
    );
    let dev_root = fake_dev_root(&["video0", "video1"]);

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["inspect", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    // Per-query failure is local; the run still completes with exit 0.
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("DEVICE: ").count(), 2);
    assert_eq!(stdout.matches("(v4l2-ctl exited with status 1)").count(), 2);
    assert_eq!(stdout.matches("capability text").count(), 2);
}

#[test]
fn test_inspect_is_idempotent() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\necho \"stable output\"\n");
    let dev_root = fake_dev_root(&["video0", "video2"]);

    let run = || {
        vidcaps_cmd()
            .env("PATH", tool_dir.path())
            .args(["inspect", "--dev-root"])
            .arg(dev_root.path())
            .output()
            .unwrap()
    };

    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

// =============================================================================
// Layer 1: Snapshot Command
// =============================================================================

#[test]
fn test_snapshot_json_structure() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\necho \"mode $3\"\n");
    let dev_root = fake_dev_root(&["video0"]);

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["snapshot", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(parsed["tool"], "vidcaps_snapshot");
    assert!(parsed["v4l2_ctl"].as_str().unwrap().ends_with("v4l2-ctl"));

    let devices = parsed["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert!(devices[0]["device"].as_str().unwrap().ends_with("video0"));
    assert_eq!(devices[0]["all"], "mode --all\n");
    assert_eq!(devices[0]["formats_ext"], "mode --list-formats-ext\n");
}

#[test]
fn test_snapshot_records_query_failure_as_error_string() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(
        tool_dir.path(),
        "#!/bin/sh\necho \"device busy\" >&2\nexit 4\n",
    );
    let dev_root = fake_dev_root(&["video0"]);

    let output = vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["snapshot", "--dev-root"])
        .arg(dev_root.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["devices"][0]["all"], "ERROR (exit 4): device busy");
}

#[test]
fn test_snapshot_writes_output_file() {
    let tool_dir = tempfile::tempdir().unwrap();
    fake_backend(tool_dir.path(), "#!/bin/sh\necho \"text\"\n");
    let dev_root = fake_dev_root(&["video0"]);
    let out_dir = tempfile::tempdir().unwrap();
    let out_file = out_dir.path().join("caps").join("snapshot.json");

    vidcaps_cmd()
        .env("PATH", tool_dir.path())
        .args(["snapshot", "--dev-root"])
        .arg(dev_root.path())
        .arg("--output")
        .arg(&out_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote capability snapshot to"));

    let parsed: serde_json::Value =
        serde_json::from_slice(&fs::read(&out_file).unwrap()).unwrap();
    assert_eq!(parsed["devices"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Layer 3: Hardware Tests (Requires V4L2 Devices and v4l-utils)
// =============================================================================

#[test]
#[ignore = "requires v4l-utils and V4L2 devices (run with --ignored on hardware)"]
#[serial]
fn test_inspect_real_dev_namespace() {
    vidcaps_cmd()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("V4L2 Camera Device Inspection"));
}

#[test]
#[ignore = "requires v4l-utils and V4L2 devices (run with --ignored on hardware)"]
#[serial]
fn test_snapshot_real_dev_namespace() {
    let output = vidcaps_cmd().arg("snapshot").output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["devices"].is_array());
}
