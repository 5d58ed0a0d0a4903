// src/tests/config_tests.rs
use crate::config::Config;
use crate::tests::utils::scratch_dir;
use std::fs;

#[test]
fn load_applies_defaults() {
    let dir = scratch_dir("config");
    let path = dir.join("config.json");
    fs::write(
        &path,
        r#"{
            "locations": [{"id": "17744", "name": "Stockholms län"}],
            "token_endpoint": "https://tokens.example.com"
        }"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.locations.len(), 1);
    assert_eq!(config.locations[0].id, "17744");
    assert_eq!(config.locations[0].name, "Stockholms län");
    assert_eq!(config.max_retry, 3);
    assert_eq!(config.idle_sleep_secs, [60, 90]);
    assert_eq!(config.cache_dir.to_str(), Some("cache"));
    assert_eq!(config.report_dir.to_str(), Some("reports"));
    assert!(config.registry_api_key.is_none());
}

#[test]
fn explicit_settings_override_defaults() {
    let dir = scratch_dir("config-override");
    let path = dir.join("config.json");
    fs::write(
        &path,
        r#"{
            "locations": [{"id": "1", "name": "Täby"}],
            "token_endpoint": "https://tokens.example.com",
            "cache_dir": "/var/lib/bostadsmatch/cache",
            "max_retry": 5,
            "idle_sleep_secs": [10, 20]
        }"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.max_retry, 5);
    assert_eq!(config.idle_sleep_secs, [10, 20]);
    assert_eq!(config.cache_dir.to_str(), Some("/var/lib/bostadsmatch/cache"));
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load("/nonexistent/config.json").is_err());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = scratch_dir("config-bad");
    let path = dir.join("config.json");
    fs::write(&path, "{").unwrap();
    assert!(Config::load(path.to_str().unwrap()).is_err());
}
