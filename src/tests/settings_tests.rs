// src/tests/settings_tests.rs

//! tests for `settings.rs`

use crate::common::FPath;
use crate::settings::{
    Setting,
    Settings,
    SettingsError,
};

use std::fs;

use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// store path inside a scratch directory
fn store_path(tempdir: &TempDir) -> FPath {
    tempdir
        .path()
        .join("config.toml")
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_load_missing_file_is_empty_store() {
    let tempdir = TempDir::new().unwrap();
    let settings = Settings::load(&store_path(&tempdir)).unwrap();
    assert!(settings.settings.is_empty());
}

#[test]
fn test_save_load_roundtrip() {
    let tempdir = TempDir::new().unwrap();
    let path = store_path(&tempdir);
    let mut settings = Settings::default();
    settings.upsert("twitch vod", "__TIME[UNIXTIME]__\t__COMMENT__");
    settings.upsert("irc export", "__TIME[%H:%M:%S]__ <__COMMENT__");
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.names(), vec!["twitch vod", "irc export"]);
}

#[test]
fn test_upsert_appends_then_updates_by_name_equality() {
    let mut settings = Settings::default();
    assert!(!settings.upsert("a", "template one"));
    assert!(!settings.upsert("b", "template two"));
    assert_eq!(settings.settings.len(), 2);

    // same name updates in place, no new entry
    assert!(settings.upsert("a", "template three"));
    assert_eq!(settings.settings.len(), 2);
    assert_eq!(settings.get("a").unwrap().template, "template three");
    // stored order is preserved
    assert_eq!(settings.names(), vec!["a", "b"]);
}

#[test]
fn test_get_by_exact_name() {
    let mut settings = Settings::default();
    settings.upsert("name", "template");
    assert!(settings.get("name").is_some());
    assert!(settings.get("Name").is_none());
    assert!(settings.get("nam").is_none());
}

#[test]
fn test_load_rejects_malformed_store() {
    let tempdir = TempDir::new().unwrap();
    let path = store_path(&tempdir);
    fs::write(&path, "this is not toml {{{{").unwrap();
    assert!(matches!(Settings::load(&path), Err(SettingsError::De(_))));
}

#[test]
fn test_save_overwrites_whole_store() {
    let tempdir = TempDir::new().unwrap();
    let path = store_path(&tempdir);
    let mut settings = Settings {
        settings: vec![
            Setting {
                name: String::from("one"),
                template: String::from("t1"),
            },
            Setting {
                name: String::from("two"),
                template: String::from("t2"),
            },
        ],
    };
    settings.save(&path).unwrap();

    // drop an entry and save again; the store holds only the new snapshot
    settings.settings.truncate(1);
    settings.save(&path).unwrap();
    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.names(), vec!["one"]);
}

#[test]
fn test_save_preserves_template_bytes() {
    // templates with tabs, quotes, backslashes survive the store
    let tempdir = TempDir::new().unwrap();
    let path = store_path(&tempdir);
    let template = "__TIME[%H\\]%M]__\t\"__COMMENT__\"";
    let mut settings = Settings::default();
    settings.upsert("tricky", template);
    settings.save(&path).unwrap();
    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.get("tricky").unwrap().template, template);
}
