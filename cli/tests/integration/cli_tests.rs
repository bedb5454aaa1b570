//! Integration tests for the CLI surface: help, version and flag validation.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn lens_deploy() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lens-deploy"));
    cmd.env("NO_COLOR", "1")
        .env_remove("LENS_DEPLOY_PREFIX")
        .env("LENS_DEPLOY_CONFIG", "/nonexistent/lens-deploy/config.yaml");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    lens_deploy().assert().code(2).stderr(predicate::str::contains(
        "Deploy the Bundestag.AI Lens app to Azure Container Apps",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    lens_deploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("fingerprint"));
}

#[test]
fn test_deploy_help_lists_tier_flags() {
    lens_deploy()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config-only"))
        .stdout(predicate::str::contains("--skip-build"))
        .stdout(predicate::str::contains("--force-rebuild"))
        .stdout(predicate::str::contains("--fast"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_deploy_help_hides_secret_env_values() {
    lens_deploy()
        .env("OPENAI_API_KEY", "sk-do-not-print")
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-do-not-print").not());
}

#[test]
fn test_cli_version_flag_shows_version() {
    lens_deploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lens-deploy"));
}

#[test]
fn test_version_command_shows_version() {
    lens_deploy()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lens-deploy 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = lens_deploy()
        .args(["version", "--json"])
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["version"], "0.1.0");
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "", "yes", "false"] {
        lens_deploy()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("lens-deploy 0.1.0"));
    }
}

#[test]
fn test_no_color_flag_still_works_without_env() {
    lens_deploy()
        .env_remove("NO_COLOR")
        .args(["--no-color", "version"])
        .assert()
        .success();
}

// --- Validation tests ---

#[test]
fn test_unknown_mode_is_rejected_by_parser() {
    lens_deploy()
        .args(["deploy", "--prefix", "lens", "--mode", "sometimes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'sometimes'"));
}

#[test]
fn test_deploy_without_prefix_fails() {
    lens_deploy()
        .args(["deploy", "--source", env!("CARGO_MANIFEST_DIR")])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--prefix"));
}

#[test]
fn test_invalid_prefix_reports_json_error() {
    let output = lens_deploy()
        .args(["--json", "deploy", "--prefix", "Lens_App"])
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["error"], true);
    assert_eq!(doc["code"], "INVALID_TARGET");
}

#[test]
fn test_skip_build_without_tag_fails() {
    let output = lens_deploy()
        .args(["--json", "deploy", "--prefix", "lens", "--skip-build"])
        .arg("--source")
        .arg(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["code"], "SKIP_BUILD_WITHOUT_TAG");
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "sizing:\n  min_replicas: 5\n  max_replicas: 2\n").expect("write");
    let output = lens_deploy()
        .env("LENS_DEPLOY_CONFIG", &config)
        .args(["--json", "plan", "--prefix", "lens", "--config-only"])
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(doc["code"], "INVALID_CONFIG");
}
