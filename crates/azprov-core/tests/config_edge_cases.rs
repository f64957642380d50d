use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use azprov_core::config::{Config, ConfigError};
use tempfile::TempDir;

#[cfg(unix)]
fn is_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim() == "0")
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// 1. Missing file / empty file
// ---------------------------------------------------------------------------

#[test]
fn load_from_nonexistent_path_returns_default_config() {
    let path = PathBuf::from("/tmp/azprov-test-nonexistent/does/not/exist/config.toml");
    assert!(!path.exists());

    let config = Config::load_from_path(&path).expect("missing file should yield defaults");
    assert_eq!(config, Config::default());
}

#[test]
fn load_empty_config_file_returns_default_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::load_from_path(&config_path).expect("empty file should parse as default");
    assert_eq!(config, Config::default());
    assert_eq!(config.arm_endpoint(), azprov_core::DEFAULT_ENDPOINT);
}

// ---------------------------------------------------------------------------
// 2. A complete file
// ---------------------------------------------------------------------------

#[test]
fn load_full_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    let content = r#"
subscription_id = "00000000-0000-0000-0000-000000000001"
resource_group = "rg-demo"
storage_account = "stdemo12345"
region = "eastus"
arm_endpoint = "https://management.usgovcloudapi.net"
authority_host = "https://login.microsoftonline.us"
poll_interval_secs = 2
"#;
    fs::write(&config_path, content).unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.resource_group.as_deref(), Some("rg-demo"));
    assert_eq!(config.storage_account.as_deref(), Some("stdemo12345"));
    assert_eq!(config.region.as_deref(), Some("eastus"));
    assert_eq!(config.arm_endpoint(), "https://management.usgovcloudapi.net");
    assert_eq!(config.poll_interval(), Duration::from_secs(2));
}

// ---------------------------------------------------------------------------
// 3. Corrupt TOML / wrong types / typos
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_toml_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[[[broken").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    let msg = err.to_string();
    assert!(msg.contains("parse"), "error should mention parsing: {msg}");
}

#[test]
fn load_wrong_value_type_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "poll_interval_secs = \"soon\"\n").unwrap();

    let result = Config::load_from_path(&config_path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_misspelled_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "resource_grup = \"rg-demo\"\n").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(
        err.to_string().contains("resource_grup"),
        "error should name the unknown key: {err}"
    );
}

// ---------------------------------------------------------------------------
// 4. Environment variable expansion
// ---------------------------------------------------------------------------

#[test]
#[serial_test::serial]
fn load_expands_environment_variables() {
    unsafe {
        std::env::set_var("AZPROV_EDGE_REGION", "westeurope");
        std::env::remove_var("AZPROV_EDGE_UNSET");
    }

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    let content = r#"
region = "${AZPROV_EDGE_REGION}"
resource_group = "${AZPROV_EDGE_UNSET:-rg-fallback}"
"#;
    fs::write(&config_path, content).unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    assert_eq!(config.region.as_deref(), Some("westeurope"));
    assert_eq!(config.resource_group.as_deref(), Some("rg-fallback"));

    unsafe {
        std::env::remove_var("AZPROV_EDGE_REGION");
    }
}

// ---------------------------------------------------------------------------
// 5. Permission errors (unix only)
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn load_unreadable_file_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "region = \"eastus\"").unwrap();
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o000)).unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError { .. }));
    assert!(err.to_string().contains("Failed to load config"));

    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o644)).unwrap();
}
