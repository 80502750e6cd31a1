//! Tests for layered settings

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use seglist::config::{local_config_path, LookupConfig, Settings};

#[test]
fn given_no_config_files_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();

    let settings = Settings::load_layers(None, Some(temp.path())).unwrap();

    assert!(settings.store_dir.ends_with(".seglist/lists"));
    assert_eq!(settings.catalog, None);
    assert_eq!(settings.lookup, LookupConfig::default());
}

#[test]
fn given_global_and_local_files_when_loading_then_local_wins() {
    let temp = TempDir::new().unwrap();
    let global = temp.path().join("seglist.toml");
    fs::write(
        &global,
        r#"
store_dir = "/srv/global-lists"
catalog = "/srv/catalog.toml"

[lookup]
limit = 25
"#,
    )
    .unwrap();
    let project = temp.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(
        local_config_path(&project),
        r#"
store_dir = "/srv/local-lists"

[lookup]
min_term_len = 3
"#,
    )
    .unwrap();

    let settings = Settings::load_layers(Some(&global), Some(&project)).unwrap();

    assert_eq!(settings.store_dir, PathBuf::from("/srv/local-lists"));
    assert_eq!(settings.catalog, Some(PathBuf::from("/srv/catalog.toml")));
    assert_eq!(settings.lookup.limit, 25);
    assert_eq!(settings.lookup.min_term_len, 3);
}

#[test]
fn given_tilde_in_store_dir_when_loading_then_expanded() {
    let temp = TempDir::new().unwrap();
    fs::write(local_config_path(temp.path()), "store_dir = \"~/segments\"\n").unwrap();

    let settings = Settings::load_layers(None, Some(temp.path())).unwrap();

    assert!(!settings.store_dir.to_string_lossy().starts_with('~'));
    assert!(settings.store_dir.ends_with("segments"));
}

#[test]
fn given_broken_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    fs::write(local_config_path(temp.path()), "store_dir = [unclosed").unwrap();

    let err = Settings::load_layers(None, Some(temp.path())).unwrap_err();

    assert!(err.to_string().contains("config error"));
}

#[test]
fn given_settings_when_rendering_toml_then_parses_back() {
    let settings = Settings {
        store_dir: PathBuf::from("/srv/lists"),
        catalog: None,
        lookup: LookupConfig {
            min_term_len: 4,
            limit: 7,
        },
    };

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
    assert!(!rendered.contains("catalog"));
}
