//! Config file access.
//!
//! - [`load()`]: read one flat `key = value` file into a [`ConfigMapping`]
//! - [`ConfigMapping::get()`]: look up a required setting; a missing key is an error, never a
//!   default
//! - [`Config`]: shared-state singleton holding the process's loaded mapping

pub mod parser;

use crate::error::{ClautoError, Result};
use crate::logging::{DEFAULT_MODULE, Log};
use crate::state::{SharedState, StateKey, StateRegistry};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::sync::Arc;

/// Ordered settings from one config file, immutable after load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigMapping {
    entries: IndexMap<String, String>,
}

impl ConfigMapping {
    /// Value of a required setting
    ///
    /// # Errors
    /// [`ClautoError::ConfigKeyMissing`] carrying `key` if it isn't set.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.get_opt(key)
            .ok_or_else(|| ClautoError::ConfigKeyMissing(key.to_string()))
    }

    /// Value of a setting the caller treats as optional
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Write every pair to `log` at CFG severity
    #[track_caller]
    pub fn log_effective(&self, log: &Log) {
        for (key, value) in self.iter() {
            log.config(format_args!("{key} = {value}"));
        }
    }
}

impl From<IndexMap<String, String>> for ConfigMapping {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a ConfigMapping {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read and parse a config file
///
/// # Errors
/// - [`ClautoError::ConfigFileUnreadable`] if the file can't be opened or read, whatever the
///   reason (missing, permissions, not UTF-8)
/// - [`ClautoError::ConfigParse`] if a line isn't valid config syntax
pub fn load<P: AsRef<Utf8Path>>(path: P) -> Result<ConfigMapping> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|source| ClautoError::ConfigFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mapping = ConfigMapping::from(parser::parse(&contents, path)?);
    tracing::debug!("Loaded {} settings from {}", mapping.len(), path);
    Ok(mapping)
}

struct ConfigState {
    path: Utf8PathBuf,
    mapping: Arc<ConfigMapping>,
}

/// Shared-state handle to the process's config
#[derive(Clone, Debug)]
pub struct Config {
    state: SharedState<ConfigState>,
    log: Log,
}

impl Config {
    /// Attach to the shared config, loading `path` on first use.
    ///
    /// Later calls share the already-loaded mapping; naming a different file only produces a
    /// DEBUG advisory.
    ///
    /// # Errors
    /// - [`ClautoError::EmptyConfigInstantiation`] if the first call gives no path
    /// - anything [`load()`] returns
    #[track_caller]
    pub fn new(registry: &StateRegistry, path: Option<&Utf8Path>) -> Result<Self> {
        let log = Log::new(registry, DEFAULT_MODULE, None)?;
        let config = Self {
            state: registry.acquire(StateKey::CONFIG)?,
            log,
        };

        let created = config.state.initialize(|| {
            let path = path.ok_or(ClautoError::EmptyConfigInstantiation)?;
            Ok(ConfigState {
                path: path.to_path_buf(),
                mapping: Arc::new(load(path)?),
            })
        })?;

        if created {
            config
                .log
                .info(format_args!("Config loaded from <{}>", config.path()));
        } else if let Some(requested) = path {
            let active = config.path();
            if active.as_path() != requested {
                config.log.debug(format_args!(
                    "Config is already loaded from <{active}>. Not loading <{requested}>."
                ));
            }
        }

        Ok(config)
    }

    /// File the shared mapping was loaded from
    pub fn path(&self) -> Utf8PathBuf {
        self.state
            .read(|state| state.path.clone())
            .unwrap_or_default()
    }

    pub fn mapping(&self) -> Arc<ConfigMapping> {
        self.state
            .read(|state| Arc::clone(&state.mapping))
            .unwrap_or_default()
    }

    /// Value of a required setting
    ///
    /// # Errors
    /// [`ClautoError::ConfigKeyMissing`] if `key` isn't set.
    pub fn get(&self, key: &str) -> Result<String> {
        self.mapping().get(key).map(str::to_string)
    }

    /// Write the effective configuration at CFG severity
    #[track_caller]
    pub fn log_effective(&self) {
        self.mapping().log_effective(&self.log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("clautod.conf")).unwrap();
        fs::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_load_and_get() {
        let (_temp_dir, path) = write_config("db_path = /var/lib/clauto/clauto.db\nport = 8080\n");
        let mapping = load(&path).unwrap();

        assert_eq!(mapping.get("db_path").unwrap(), "/var/lib/clauto/clauto.db");
        assert_eq!(mapping.get("port").unwrap(), "8080");
        assert_eq!(mapping.get_opt("missing"), None);
    }

    #[test]
    fn test_missing_key_names_key() {
        let (_temp_dir, path) = write_config("port = 8080\n");
        let mapping = load(&path).unwrap();

        match mapping.get("X") {
            Err(ClautoError::ConfigKeyMissing(key)) => assert_eq!(key, "X"),
            other => panic!("Expected ConfigKeyMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("absent.conf")).unwrap();

        assert!(matches!(
            load(&path),
            Err(ClautoError::ConfigFileUnreadable { .. })
        ));
    }

    #[test]
    fn test_iter_in_file_order() {
        let (_temp_dir, path) = write_config("z = 1\na = 2\nm = 3\n");
        let mapping = load(&path).unwrap();

        let keys: Vec<&str> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_first_config_needs_path() {
        let registry = StateRegistry::new();
        assert!(matches!(
            Config::new(&registry, None),
            Err(ClautoError::EmptyConfigInstantiation)
        ));
    }

    #[test]
    fn test_reentry_shares_mapping() {
        let (_temp_dir, path) = write_config("port = 8080\n");
        let (_other_dir, other) = write_config("port = 9090\n");
        let registry = StateRegistry::new();

        let first = Config::new(&registry, Some(&path)).unwrap();
        let second = Config::new(&registry, None).unwrap();
        let third = Config::new(&registry, Some(&other)).unwrap();

        assert_eq!(second.get("port").unwrap(), "8080");
        assert_eq!(third.path(), first.path());
        assert!(Arc::ptr_eq(&first.mapping(), &third.mapping()));
    }
}
