use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a test command isolated from the caller's Azure setup
fn azprov() -> Command {
    let mut cmd = Command::cargo_bin("azprov").unwrap();
    for var in [
        "AZPROV_RESOURCE_GROUP",
        "AZPROV_STORAGE_ACCOUNT",
        "AZPROV_REGION",
        "AZPROV_ARM_ENDPOINT",
        "AZPROV_ACCESS_TOKEN",
        "AZURE_SUBSCRIPTION_ID",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env(
        "AZPROV_CONFIG_FILE",
        "/tmp/azprov-test-nonexistent/config.toml",
    );
    cmd
}

#[test]
fn test_help_flag() {
    azprov()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("storage account"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_help_short_flag() {
    azprov()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    azprov()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("azprov"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command() {
    azprov()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "azprov {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json() {
    let output = azprov()
        .args(["version", "-o", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["name"], "azprov");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_args_shows_help() {
    azprov()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    azprov()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_provision_help_lists_env_vars() {
    azprov()
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--resource-group"))
        .stdout(predicate::str::contains("AZPROV_STORAGE_ACCOUNT"))
        .stdout(predicate::str::contains("--wait-timeout"));
}

#[test]
fn test_resource_group_alias() {
    azprov()
        .args(["rg", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ensure"));
}

#[test]
fn test_invalid_output_format() {
    azprov()
        .args(["version", "-o", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_provision_without_inputs_fails_before_auth() {
    azprov()
        .arg("provision")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing resource group name"))
        .stderr(predicate::str::contains("AZPROV_RESOURCE_GROUP"));
}

#[test]
fn test_provision_missing_region_names_flag() {
    azprov()
        .args(["provision", "-g", "rg-demo"])
        .env("AZPROV_STORAGE_ACCOUNT", "stdemo12345")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--region"));
}

#[test]
fn test_blank_env_input_is_rejected() {
    azprov()
        .arg("provision")
        .env("AZPROV_RESOURCE_GROUP", "rg-demo")
        .env("AZPROV_STORAGE_ACCOUNT", "stdemo12345")
        .env("AZPROV_REGION", "   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing region"));
}

#[test]
fn test_resource_group_ensure_requires_region() {
    azprov()
        .args(["resource-group", "ensure", "-g", "rg-demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing region"));
}

#[test]
fn test_corrupt_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[[[broken").unwrap();

    azprov()
        .args(["provision", "-g", "rg-demo", "-n", "stdemo12345", "-l", "eastus"])
        .env("AZPROV_CONFIG_FILE", &config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_completions_bash() {
    azprov()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("azprov"));
}

#[test]
fn test_completions_invalid_shell() {
    azprov()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
