// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use shared_catalog_core::config::Config;
use shared_catalog_core::error::CatalogError;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_defaults_match_the_library_names() {
    let config = Config::default();
    assert_eq!(config.segment_name, "/book_shm");
    assert_eq!(config.signal_name, "/book_sem");
    assert_eq!(config.max_worker_delay_ms, 14_000);
    config.validate().unwrap();
}

#[test]
fn test_load_full_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        r#"{"segment_name":"/lib_shm","signal_name":"/lib_sem","max_worker_delay_ms":5}"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.segment_name, "/lib_shm");
    assert_eq!(config.signal_name, "/lib_sem");
    assert_eq!(config.max_worker_delay_ms, 5);
}

#[test]
fn test_missing_fields_take_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, r#"{"max_worker_delay_ms":0}"#);

    let config = Config::load(&path).unwrap();
    assert_eq!(config.segment_name, "/book_shm");
    assert_eq!(config.max_worker_delay_ms, 0);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_requires_the_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Config::load(dir.path().join("absent.json")),
        Err(CatalogError::Config(_))
    ));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "{ not json");
    assert!(matches!(Config::load_or_default(&path), Err(CatalogError::Config(_))));
}

#[test]
fn test_unknown_fields_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, r#"{"rows":7}"#);
    assert!(matches!(Config::load(&path), Err(CatalogError::Config(_))));
}

#[test]
fn test_object_names_are_validated() {
    let bad = ["book_shm", "/", "/a/b", "/nul\0", ""];
    for name in bad {
        let config = Config {
            segment_name: name.to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err(), "accepted {:?}", name);
    }

    let long = Config {
        signal_name: format!("/{}", "s".repeat(300)),
        ..Config::default()
    };
    assert!(long.validate().is_err());
}

#[test]
fn test_invalid_name_in_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, r#"{"signal_name":"/two/parts"}"#);
    assert!(matches!(Config::load(&path), Err(CatalogError::Config(_))));
}
