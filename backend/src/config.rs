//! Server configuration.
//!
//! Resolution order, later wins:
//! 1. compiled defaults (`AppConfig::default`)
//! 2. the TOML file named by `PORTAL_CONFIG` (default `portal.toml`); a
//!    missing file is not an error
//! 3. `PORTAL_HOST`, `PORTAL_PORT`, `PORTAL_DATABASE`, `PORTAL_STORAGE_DIR`
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! public_base_url = "https://portal.example.org/storage"
//!
//! [ingest]
//! orphan_policy = "compensate"
//! column_mapping = "by_header"
//! numeric_policy = "reject"
//!
//! [bootstrap_admin]
//! token = "change-me"
//! email = "office@example.org"
//! ```

use crate::ingest::{NumericPolicy, OrphanPolicy};
use common::csv::ColumnMapping;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "PORTAL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Knobs of the results upload workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub orphan_policy: OrphanPolicy,
    pub column_mapping: ColumnMapping,
    pub numeric_policy: NumericPolicy,
}

/// Admin session created at startup, for installations without an external
/// sign-in service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapAdmin {
    pub token: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub storage_dir: PathBuf,
    /// Prefix of public object URLs.
    pub public_base_url: String,
    /// Open the portal in a browser once the server is up.
    pub open_browser: bool,
    pub max_upload_bytes: usize,
    pub ingest: IngestSettings,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("portal.sqlite"),
            storage_dir: PathBuf::from("storage"),
            public_base_url: "/storage".to_string(),
            open_browser: false,
            max_upload_bytes: 10 * 1024 * 1024,
            ingest: IngestSettings::default(),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the file named by `PORTAL_CONFIG` and the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_path(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a TOML file, falling back to defaults when it does not exist.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `PORTAL_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("PORTAL_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORTAL_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORTAL_PORT",
                value: port,
            })?;
        }
        if let Some(db) = lookup("PORTAL_DATABASE") {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup("PORTAL_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str("port = 9000\n[ingest]\norphan_policy = \"compensate\"").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.ingest.orphan_policy, OrphanPolicy::Compensate);
        assert_eq!(config.ingest.column_mapping, ColumnMapping::Positional);
        assert_eq!(config.ingest.numeric_policy, NumericPolicy::Accept);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("[ingest]\norphan_policy = \"retry\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn environment_overrides_file() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("PORTAL_PORT", "8181"), ("PORTAL_DATABASE", "/var/lib/portal.db")]);
        let mut config = AppConfig::from_toml_str("port = 9000").unwrap();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.port, 8181);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/portal.db"));
        assert_eq!(config.url(), "http://127.0.0.1:8181");
    }

    #[test]
    fn bad_port_in_environment() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|k| (k == "PORTAL_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORTAL_PORT", .. }));
    }
}
