use super::*;

#[test]
fn config_defaults() {
    let config = Config::default();
    assert_eq!(config.path, None);
    assert!(config.persist_catalog);
    assert!(config.sync_on_commit);
    assert_eq!(config.catalog_path(), None);
    assert_eq!(Database::in_memory().config(), &Config::in_memory());
}

#[test]
fn config_from_json_fills_missing_fields() {
    let config = Config::from_json_str(r#"{"path": "/tmp/relkv", "sync_on_commit": false}"#)
        .unwrap();
    assert_eq!(config.path.as_deref(), Some(std::path::Path::new("/tmp/relkv")));
    assert!(config.persist_catalog);
    assert!(!config.sync_on_commit);
    assert_eq!(
        config.catalog_path(),
        Some(std::path::PathBuf::from("/tmp/relkv/catalog.json"))
    );

    let empty = Config::from_json_str("{}").unwrap();
    assert_eq!(empty, Config::default());
}

#[test]
fn config_load_errors() {
    let dir = temp_dir("config");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("relkv.json");
    assert!(matches!(
        Config::load(&file),
        Err(relkv_core::config::ConfigError::Read { .. })
    ));

    std::fs::write(&file, "{ not json").unwrap();
    assert!(matches!(
        Config::load(&file),
        Err(relkv_core::config::ConfigError::Malformed(_))
    ));

    let json = serde_json::json!({ "path": dir.join("data") }).to_string();
    std::fs::write(&file, json).unwrap();
    let loaded = Config::load(&file).unwrap();
    assert_eq!(loaded.path, Some(dir.join("data")));

    assert!(Database::open(loaded).is_ok());
}
