//! Commands that run entirely against a local source tree.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn lens_deploy(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lens-deploy"));
    cmd.env("NO_COLOR", "1")
        .env_remove("LENS_DEPLOY_PREFIX")
        .env("LENS_DEPLOY_CONFIG", config_dir.join("config.yaml"));
    cmd
}

fn checkout() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/web")).expect("mkdir");
    std::fs::write(root.join("Dockerfile"), "FROM python:3.11-slim\n").expect("write");
    std::fs::write(root.join("requirements.txt"), "streamlit\n").expect("write");
    std::fs::write(
        root.join("src/web/streamlit_app_modular.py"),
        "import streamlit as st\n",
    )
    .expect("write");
    dir
}

#[test]
fn test_fingerprint_prints_hex_digest() {
    let src = checkout();
    lens_deploy(src.path())
        .arg("fingerprint")
        .arg("--source")
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{64}\n$").expect("regex"));
}

#[test]
fn test_fingerprint_is_stable_and_tracks_sources() {
    let src = checkout();
    let run = || {
        lens_deploy(src.path())
            .args(["--json", "fingerprint", "--source"])
            .arg(src.path())
            .output()
            .expect("run binary")
    };
    let first: serde_json::Value = serde_json::from_slice(&run().stdout).expect("json");
    let second: serde_json::Value = serde_json::from_slice(&run().stdout).expect("json");
    assert_eq!(first["fingerprint"], second["fingerprint"]);
    assert_eq!(first["descriptor"], "Dockerfile");

    std::fs::write(src.path().join("src/web/helpers.py"), "X = 1\n").expect("write");
    let third: serde_json::Value = serde_json::from_slice(&run().stdout).expect("json");
    assert_ne!(first["fingerprint"], third["fingerprint"]);
}

#[test]
fn test_fingerprint_without_sources_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    lens_deploy(dir.path())
        .arg("fingerprint")
        .arg("--source")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_deploy_missing_descriptor_fails_before_cloud_calls() {
    let src = checkout();
    std::fs::remove_file(src.path().join("Dockerfile")).expect("remove");
    let output = lens_deploy(src.path())
        .args(["--json", "deploy", "--prefix", "lens", "--source"])
        .arg(src.path())
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["code"], "MISSING_INPUT");
    assert!(
        doc["message"]
            .as_str()
            .is_some_and(|m| m.contains("Dockerfile"))
    );
}

#[test]
fn test_plan_config_only_never_builds() {
    let src = checkout();
    let output = lens_deploy(src.path())
        .args(["--json", "plan", "--prefix", "lens", "--config-only", "--fast", "--source"])
        .arg(src.path())
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["tier"], "config_only");
    assert_eq!(doc["build"], false);
    assert_eq!(doc["ignored_flags"][0], "--fast ignored: --config-only takes precedence");
    assert!(!src.path().join(".lens-deploy").exists());
}

#[test]
fn test_plan_human_output_names_the_tier() {
    let src = checkout();
    lens_deploy(src.path())
        .args(["plan", "--prefix", "lens", "--force-rebuild", "--source"])
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("force-rebuild"));
}
