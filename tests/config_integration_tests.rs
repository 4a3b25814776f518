//! Integration tests for config loading and the shared Config
//!
//! These tests verify:
//! - Written pairs load back exactly and in order
//! - Missing settings name the missing key
//! - Unreadable files and malformed lines are reported, not defaulted
//! - The effective configuration is logged at CFG
//! - Config shares one mapping per registry

use camino::{Utf8Path, Utf8PathBuf};
use clauto_common::config::{self, parser::FLAG_VALUE};
use clauto_common::logging::log_file_path;
use clauto_common::{ClautoError, Config, ExitCode, Log, Severity, StateRegistry};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

fn create_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

fn write_config(dir: &Utf8Path, name: &str, contents: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

proptest! {
    #[test]
    fn prop_written_pairs_load_back(
        pairs in prop::collection::vec(("[a-z_]{1,12}", "[A-Za-z0-9/._-]{1,20}"), 0..20)
    ) {
        let (_temp_dir, dir) = create_config_dir();

        let mut expected = IndexMap::new();
        for (key, value) in &pairs {
            expected.insert(key.clone(), value.clone());
        }
        let contents: String = expected
            .iter()
            .map(|(k, v)| format!("{k} = {v}\n"))
            .collect();
        let path = write_config(&dir, "clautod.conf", &contents);

        let mapping = config::load(&path).unwrap();

        prop_assert_eq!(mapping.len(), expected.len());
        for ((key, value), (loaded_key, loaded_value)) in expected.iter().zip(mapping.iter()) {
            prop_assert_eq!(key.as_str(), loaded_key);
            prop_assert_eq!(value.as_str(), loaded_value);
        }
    }
}

#[test]
fn test_realistic_daemon_file() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(
        &dir,
        "clautod.conf",
        "# clautod settings\n\
         [clautod]\n\
         db_path = /var/lib/clauto/clauto.db\n\
         log_dir: /var/log/clauto ; overridden in packaging\n\
         port 8080\n\
         debug\n",
    );

    let mapping = config::load(&path).unwrap();

    assert_eq!(mapping.get("db_path").unwrap(), "/var/lib/clauto/clauto.db");
    assert_eq!(mapping.get("log_dir").unwrap(), "/var/log/clauto");
    assert_eq!(mapping.get("port").unwrap(), "8080");
    assert_eq!(mapping.get("debug").unwrap(), FLAG_VALUE);
}

#[test]
fn test_missing_key_is_error_with_name() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(&dir, "clautod.conf", "port = 8080\n");
    let mapping = config::load(&path).unwrap();

    let err = mapping.get("X").unwrap_err();

    assert!(matches!(&err, ClautoError::ConfigKeyMissing(key) if key == "X"));
    assert_eq!(err.exit_code(), ExitCode::ConfigSettingMissing);
    assert!(err.to_string().contains("<X>"));
}

#[test]
fn test_unreadable_file() {
    let (_temp_dir, dir) = create_config_dir();

    let err = config::load(dir.join("absent.conf")).unwrap_err();

    assert!(matches!(err, ClautoError::ConfigFileUnreadable { .. }));
    assert_eq!(err.exit_code(), ExitCode::ConfigFileUnreadable);
}

#[test]
fn test_malformed_line_reports_position() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(&dir, "clautod.conf", "port = 8080\n= orphan\n");

    match config::load(&path) {
        Err(ClautoError::ConfigParse { line_number, line, .. }) => {
            assert_eq!(line_number, 2);
            assert_eq!(line, "= orphan");
        }
        other => panic!("Expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn test_log_effective_writes_cfg_lines() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(&dir, "clautod.conf", "port = 8080\nworkers = 4\n");
    let registry = StateRegistry::new();
    let log = Log::new(&registry, "clautod", Some(&dir)).unwrap();
    log.set_level(Severity::Config);

    let config = Config::new(&registry, Some(&path)).unwrap();
    config.log_effective();
    log.flush();

    let contents = fs::read_to_string(log_file_path(&dir, "clautod")).unwrap();
    assert!(contents.contains("[CFG] port = 8080"));
    assert!(contents.contains("[CFG] workers = 4"));
    // INF banner is below the CFG threshold
    assert!(!contents.contains("Config loaded from"));
}

#[test]
fn test_config_singleton_across_call_sites() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(&dir, "clautod.conf", "port = 8080\n");
    let registry = StateRegistry::new();

    let daemon = Config::new(&registry, Some(&path)).unwrap();
    let handler = Config::new(&registry, None).unwrap();

    assert_eq!(handler.path(), path);
    assert_eq!(handler.get("port").unwrap(), daemon.get("port").unwrap());
    assert!(matches!(
        handler.get("db_path"),
        Err(ClautoError::ConfigKeyMissing(_))
    ));
}

#[test]
fn test_failed_first_load_leaves_config_uninitialized() {
    let (_temp_dir, dir) = create_config_dir();
    let registry = StateRegistry::new();

    assert!(Config::new(&registry, Some(&dir.join("absent.conf"))).is_err());

    let path = write_config(&dir, "clautod.conf", "port = 8080\n");
    let config = Config::new(&registry, Some(&path)).unwrap();
    assert_eq!(config.get("port").unwrap(), "8080");
}

#[test]
fn test_mapping_serializes_in_file_order() {
    let (_temp_dir, dir) = create_config_dir();
    let path = write_config(&dir, "clautod.conf", "z = zeta\na = alpha\n");
    let mapping = config::load(&path).unwrap();

    let yaml = serde_yaml_ng::to_string(&mapping).unwrap();

    assert_eq!(yaml, "z: zeta\na: alpha\n");
}
