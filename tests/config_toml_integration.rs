use nuker::{CancelCooldown, NukerConfig};
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_config_serialization_roundtrip() {
    let mut original_config = NukerConfig::default();
    original_config.reddit.client_id = "app-id".to_string();
    original_config.engine.delete_pacing_ms = 600;
    original_config.engine.cancel_cooldown = CancelCooldown::Always { secs: 45 };

    let toml_str = original_config
        .to_toml_string()
        .expect("Should be able to serialize config to TOML");

    assert!(!toml_str.is_empty(), "TOML string should not be empty");
    assert!(toml_str.contains("[reddit]"), "Should contain reddit section");
    assert!(toml_str.contains("[engine]"), "Should contain engine section");

    let deserialized_config =
        NukerConfig::from_toml_str(&toml_str).expect("Should be able to deserialize TOML string");

    assert_eq!(deserialized_config.reddit.client_id, "app-id");
    assert_eq!(
        deserialized_config.reddit.api_base_url,
        original_config.reddit.api_base_url
    );
    assert_eq!(deserialized_config.engine.delete_pacing_ms, 600);
    assert_eq!(
        deserialized_config.engine.cancel_cooldown,
        CancelCooldown::Always { secs: 45 }
    );
}

#[test]
fn test_config_file_operations() {
    let mut original_config = NukerConfig::default();
    original_config.state_dir = Some(PathBuf::from("/var/lib/nuker"));
    original_config.engine.page_size = 25;

    let temp_file = NamedTempFile::new().expect("Should be able to create temporary file");
    let temp_path = temp_file.path();

    original_config
        .to_toml_file(temp_path)
        .expect("Should be able to save config to file");

    let loaded_config =
        NukerConfig::from_toml_file(temp_path).expect("Should be able to load config from file");

    assert_eq!(loaded_config.state_dir, original_config.state_dir);
    assert_eq!(loaded_config.engine.page_size, 25);
    assert_eq!(loaded_config.nuker_dir(), PathBuf::from("/var/lib/nuker"));
}

#[test]
fn test_cancel_cooldown_policies_parse() {
    let config = NukerConfig::from_toml_str(
        r#"
        [engine.cancel_cooldown]
        policy = "none"
        "#,
    )
    .unwrap();
    assert_eq!(config.engine.cancel_cooldown, CancelCooldown::None);

    let config = NukerConfig::from_toml_str(
        r#"
        [engine.cancel_cooldown]
        policy = "after_progress"
        secs = 90
        "#,
    )
    .unwrap();
    assert_eq!(
        config.engine.cancel_cooldown,
        CancelCooldown::AfterProgress { secs: 90 }
    );
}

#[test]
fn test_empty_config_is_all_defaults() {
    let config = NukerConfig::from_toml_str("").unwrap();

    assert!(config.state_dir.is_none());
    assert!(config.reddit.client_id.is_empty());
    assert_eq!(config.engine.page_size, 100);
    assert_eq!(config.engine.max_log_entries, 500);
    assert_eq!(
        config.engine.cancel_cooldown,
        CancelCooldown::AfterProgress { secs: 30 }
    );
}

#[test]
fn test_config_error_handling() {
    let invalid_toml = "this is not valid toml [[[";
    let result = NukerConfig::from_toml_str(invalid_toml);
    assert!(result.is_err(), "Should fail to parse invalid TOML");

    let wrong_type = r#"
        [engine]
        page_size = "lots"
    "#;
    assert!(
        NukerConfig::from_toml_str(wrong_type).is_err(),
        "Should reject a non-numeric page size"
    );

    let result = NukerConfig::from_toml_file("/non/existent/path/nuker.toml");
    assert!(result.is_err(), "Should fail to load non-existent file");
}
