//! Server configuration: defaults, optional TOML file, then environment.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const ENV_BIND_ADDR: &str = "TRACKER_BIND_ADDR";
pub const ENV_DB_PATH: &str = "TRACKER_DB_PATH";
pub const ENV_BASE_URL: &str = "TRACKER_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "TRACKER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRACKER_LOG_DIR";

/// Runtime settings of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind_addr: String,
    /// SQLite database file; created and migrated on startup.
    pub db_path: PathBuf,
    /// Prefix of every link in responses. Empty yields root-relative links.
    pub base_url: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            db_path: PathBuf::from("tracker.sqlite3"),
            base_url: String::new(),
            log_level: tracker_core::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidBindAddr(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidBindAddr(value) => write!(f, "invalid bind address `{value}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidBindAddr(_) => None,
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid by `path` when given, overlaid by `TRACKER_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_BIND_ADDR) {
            self.bind_addr = value;
        }
        if let Some(value) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_BASE_URL) {
            self.base_url = value;
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, ENV_BASE_URL, ENV_DB_PATH, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn defaults_listen_locally_with_relative_links() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.db_path, PathBuf::from("tracker.sqlite3"));
        assert!(config.base_url.is_empty());
        assert!(config.log_dir.is_none());
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn file_values_overlay_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"0.0.0.0:9000\"\nbase_url = \"http://tracker.test\"").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.base_url, "http://tracker.test");
        assert_eq!(config.db_path, PathBuf::from("tracker.sqlite3"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9000").unwrap();
        assert!(matches!(
            ServerConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn environment_overrides_win_and_blank_values_are_ignored() {
        let env = HashMap::from([
            (ENV_DB_PATH, "/var/lib/tracker/db.sqlite3"),
            (ENV_BASE_URL, "  "),
            (ENV_LOG_DIR, "/var/log/tracker"),
        ]);
        let mut config = ServerConfig {
            base_url: "http://from-file".to_string(),
            ..ServerConfig::default()
        };
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/var/lib/tracker/db.sqlite3"));
        assert_eq!(config.base_url, "http://from-file");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/tracker")));
    }

    #[test]
    fn bad_bind_addr_is_reported() {
        let config = ServerConfig {
            bind_addr: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidBindAddr(_))
        ));
    }
}
