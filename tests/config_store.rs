mod common;

use std::fs;

use minifyd::config::{ConfigStore, WatchConfig};

#[test]
fn missing_record_yields_defaults_and_creates_the_file() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let path = dir.path().join("data/minifierData.json");

    let store = ConfigStore::new(&path);
    let config = store.load().unwrap();
    assert_eq!(config, WatchConfig::default());
    assert!(!config.is_watching);
    assert!(config.allow_notify);

    // The repair wrote the defaults back with the fixed field names.
    let text = fs::read_to_string(&path).unwrap();
    for field in ["folders", "isWatching", "allowNotify", "nodePath"] {
        assert!(text.contains(field), "missing field {field} in {text}");
    }
}

#[test]
fn corrupt_record_is_replaced_with_defaults() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let path = dir.path().join("minifierData.json");
    fs::write(&path, "{ not json at all").unwrap();

    let store = ConfigStore::new(&path);
    assert_eq!(store.load().unwrap(), WatchConfig::default());

    let repaired: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(repaired["isWatching"], false);
}

#[test]
fn save_then_load_round_trips() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let store = ConfigStore::new(dir.path().join("minifierData.json"));

    let mut config = WatchConfig::default();
    config.add_folder("/srv/site");
    config.is_watching = true;
    config.runtime_path = "/usr/local/bin/minifyd-worker".to_string();
    store.save(&config).unwrap();

    assert_eq!(store.load().unwrap(), config);
}

#[test]
fn partial_record_fills_in_defaults() {
    common::init_tracing();
    let dir = common::visible_tempdir();
    let path = dir.path().join("minifierData.json");
    fs::write(&path, r#"{ "folders": ["/srv/site"] }"#).unwrap();

    let config = ConfigStore::new(&path).load().unwrap();
    assert_eq!(config.folders, vec!["/srv/site"]);
    assert!(config.allow_notify);
    assert!(config.runtime_path.is_empty());
}

#[test]
fn add_folder_rejects_exact_duplicates() {
    let mut config = WatchConfig::default();
    assert!(config.add_folder("/srv/a"));
    assert!(config.add_folder("/srv/b"));
    assert!(!config.add_folder("/srv/a"));
    // Different strings for the same location are distinct entries.
    assert!(config.add_folder("/srv/a/"));
    assert_eq!(config.folders, vec!["/srv/a", "/srv/b", "/srv/a/"]);

    assert!(config.remove_folder("/srv/b"));
    assert!(!config.remove_folder("/srv/b"));
    assert_eq!(config.folders, vec!["/srv/a", "/srv/a/"]);
}
