#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use followgraph::options::CONFIG_ENV;
use followgraph::{BoundMode, ConfigError, MemStore, RelationOptions, RelationStore};
use tempfile::tempdir;

/// Serializes tests that read or write the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const LEGACY_LAYOUT: &str = r#"
[relations]
forward_index = "follows"
reverse_index = "followedBy"
origin_attr = "from"
target_attr = "to"
bound_mode = "last_byte"
scan_batch_size = 64
"#;

#[test]
fn loads_relations_table_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, LEGACY_LAYOUT).unwrap();

    let opts = RelationOptions::from_file(&path).unwrap();
    assert_eq!(opts.forward_index, "follows");
    assert_eq!(opts.reverse_index, "followedBy");
    assert_eq!(opts.origin_attr, "from");
    assert_eq!(opts.target_attr, "to");
    assert_eq!(opts.bound_mode, BoundMode::LastByte);
    assert_eq!(opts.scan_batch_size, 64);

    assert_eq!(RelationOptions::load(Some(path)).unwrap(), opts);
}

#[test]
fn missing_explicit_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert_eq!(
        RelationOptions::load(Some(path)).unwrap(),
        RelationOptions::default()
    );
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[relations\nforward_index = ").unwrap();

    match RelationOptions::from_file(&path) {
        Err(ConfigError::Parse { path: Some(reported), .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
    let err = RelationOptions::load(Some(path.clone())).unwrap_err();
    assert!(err.to_string().contains("broken.toml"), "{err}");
}

#[test]
fn unreadable_path_reports_read_error() {
    let dir = tempdir().unwrap();
    let path: PathBuf = dir.path().to_path_buf();

    match RelationOptions::from_file(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn invalid_values_are_rejected_after_parsing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[relations]\nforward_index = \"edges\"\nreverse_index = \"edges\"\n",
    )
    .unwrap();

    assert!(matches!(
        RelationOptions::from_file(&path),
        Err(ConfigError::Invalid { field: "reverse_index", .. })
    ));
}

#[test]
fn rendered_options_load_back_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let opts = RelationOptions::default()
        .forward_index("follows")
        .scan_batch_size(16);
    fs::write(&path, opts.to_toml_string().unwrap()).unwrap();

    assert_eq!(RelationOptions::from_file(&path).unwrap(), opts);
}

#[test]
fn store_built_from_loaded_options_uses_configured_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, LEGACY_LAYOUT).unwrap();

    let kv = MemStore::new();
    let rel = RelationStore::new(RelationOptions::from_file(&path).unwrap()).unwrap();
    assert_eq!(rel.options().reverse_index, "followedBy");
    rel.follow(&kv, "alice", "bob").unwrap();

    assert_eq!(kv.len("follows"), 1);
    assert_eq!(kv.len("followedBy"), 1);
    assert_eq!(kv.len("forward"), 0);
    assert_eq!(rel.count_followed_by(&kv, "bob").unwrap(), 1);
}

#[test]
fn env_variable_names_the_config_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("from_env.toml");
    fs::write(&path, LEGACY_LAYOUT).unwrap();
    let previous = env::var_os(CONFIG_ENV);

    env::set_var(CONFIG_ENV, &path);
    let from_env = RelationOptions::load(None);

    let explicit = dir.path().join("explicit.toml");
    fs::write(&explicit, "[relations]\nforward_index = \"out\"\nreverse_index = \"in\"\n").unwrap();
    let explicit_wins = RelationOptions::load(Some(explicit));

    env::set_var(CONFIG_ENV, dir.path().join("absent.toml"));
    let missing = RelationOptions::load(None);

    match previous {
        Some(value) => env::set_var(CONFIG_ENV, value),
        None => env::remove_var(CONFIG_ENV),
    }

    let from_env = from_env.unwrap();
    assert_eq!(from_env.forward_index, "follows");
    assert_eq!(from_env.bound_mode, BoundMode::LastByte);
    assert_eq!(explicit_wins.unwrap().forward_index, "out");
    assert_eq!(missing.unwrap(), RelationOptions::default());
}
