//! Client configuration.
//!
//! `LoglineConfig` is read from `config.json` in the Logline config
//! directory. Environment variables override the file, and explicit CLI flags
//! override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;
use crate::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SESSION_FILE_NAME: &str = "session.json";
pub const DATABASE_FILE_NAME: &str = "logline.db";

pub const DB_PATH_ENV: &str = "LOGLINE_DB_PATH";
pub const CONFIG_DIR_ENV: &str = "LOGLINE_CONFIG_DIR";

const APP_DIR_NAME: &str = "logline";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const MIN_POLL_INTERVAL_MS: u64 = 50;

/// Persisted client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoglineConfig {
    /// Local journal database file
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// How often `watch` checks for commits from other processes
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl LoglineConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|error| match error {
            Error::Config(message) => Error::Config(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// Parse a JSON config payload.
    pub fn parse(raw: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(raw)
            .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms.is_some_and(|ms| ms < MIN_POLL_INTERVAL_MS) {
            return Err(Error::Config(format!(
                "poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}"
            )));
        }
        Ok(())
    }

    /// Validate and write the config as pretty JSON, creating parent dirs.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }
}

/// Locations of the files the CLI keeps in its config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Resolve from `LOGLINE_CONFIG_DIR`, falling back to the platform
    /// config directory.
    ///
    /// `lookup` reads an environment variable; tests pass a closure.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = normalize_text_option(lookup(CONFIG_DIR_ENV)) {
            return Ok(Self::new(dir));
        }
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("could not resolve a config directory".to_string()))?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join(SESSION_FILE_NAME)
    }
}

/// Pick the database path: flag, then `LOGLINE_DB_PATH`, then the config
/// file, then the platform data directory.
pub fn resolve_db_path(
    flag: Option<PathBuf>,
    config: &LoglineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = normalize_text_option(lookup(DB_PATH_ENV)) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.db_path.clone() {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| Error::Config("could not resolve a data directory".to_string()))?;
    Ok(base.join(APP_DIR_NAME).join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let error = LoglineConfig::parse(r#"{"db_path": "/tmp/a.db", "sync": true}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn parse_rejects_tiny_poll_interval() {
        assert!(matches!(
            LoglineConfig::parse(r#"{"poll_interval_ms": 1}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn poll_interval_defaults() {
        assert_eq!(
            LoglineConfig::default().poll_interval(),
            Duration::from_millis(500)
        );
        let config = LoglineConfig::parse(r#"{"poll_interval_ms": 250}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn db_path_precedence_is_flag_env_file() {
        let config = LoglineConfig {
            db_path: Some(PathBuf::from("/from/file.db")),
            ..LoglineConfig::default()
        };
        let with_env = env(&[(DB_PATH_ENV, "/from/env.db")]);

        assert_eq!(
            resolve_db_path(Some(PathBuf::from("/from/flag.db")), &config, &with_env).unwrap(),
            PathBuf::from("/from/flag.db")
        );
        assert_eq!(
            resolve_db_path(None, &config, &with_env).unwrap(),
            PathBuf::from("/from/env.db")
        );
        assert_eq!(
            resolve_db_path(None, &config, env(&[(DB_PATH_ENV, "  ")])).unwrap(),
            PathBuf::from("/from/file.db")
        );
    }

    #[test]
    fn config_dir_env_override() {
        let paths = ConfigPaths::resolve(env(&[(CONFIG_DIR_ENV, "/tmp/logline-config")])).unwrap();
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/logline-config/config.json")
        );
        assert_eq!(
            paths.session_file(),
            PathBuf::from("/tmp/logline-config/session.json")
        );
    }

    #[test]
    fn load_missing_file_yields_defaults_and_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        assert_eq!(
            LoglineConfig::load_from_path(&path).unwrap(),
            LoglineConfig::default()
        );

        let config = LoglineConfig {
            db_path: Some(dir.path().join("journals.db")),
            poll_interval_ms: Some(1_000),
        };
        config.save_to_path(&path).unwrap();
        assert_eq!(LoglineConfig::load_from_path(&path).unwrap(), config);
    }
}
